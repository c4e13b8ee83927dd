//! Canvas interaction and state engine for the product-mockup editor.
//!
//! This crate is compiled to WebAssembly and runs in the browser, but every
//! piece of logic below [`engine::Engine`] is browser-free and tested natively.
//! It owns the live design (elements plus background color), translates raw
//! pointer and keyboard input into mutations of that design, keeps the
//! zoom/pan viewport, and records undo/redo history. The host layer wires DOM
//! events to the engine, paints the [`render::Scene`] it exposes, and persists
//! the [`doc::DesignState`] on demand.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`doc`] | Design elements, sparse patches, and the persisted design state |
//! | [`transform`] | Screen to logical coordinate conversion and its inverse |
//! | [`viewport`] | Zoom/pan controller and the panning mode |
//! | [`manipulate`] | Move, aspect-preserving resize, and rotate math |
//! | [`hit`] | Hit-testing against rotated element boxes and handles |
//! | [`history`] | Snapshot-based undo/redo with gesture coalescing |
//! | [`layers`] | Z-order swaps and the hidden/locked id sets |
//! | [`replace`] | Non-destructive image-swap preview and commit |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`render`] | Read-only scene view for the rendering collaborator |
//! | [`config`] | Host-supplied editor configuration |
//! | [`error`] | Error types |
//! | [`consts`] | Shared numeric constants (logical size, minimum sizes, etc.) |

pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod error;
pub mod history;
pub mod hit;
pub mod input;
pub mod layers;
pub mod manipulate;
pub mod render;
pub mod replace;
pub mod transform;
pub mod viewport;
