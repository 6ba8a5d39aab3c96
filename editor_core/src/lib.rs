#![no_std]

//! # Editor Core
//!
//! Document model and editing session for cellpad, independent of any
//! terminal or filesystem.
//!
//! ## Philosophy
//!
//! - **No_std compatible**: Uses alloc but not std
//! - **Deterministic**: Same key trace => same editor state
//! - **Cells, not lines**: The document is a chain of single-byte cells
//! - **Mechanism over policy**: Core provides editing primitives, hosts decide rendering
//! - **No ambient authority**: IO requests are explicit, never automatic
//!
//! ## Design
//!
//! The core provides:
//! - CellStore: Arena-backed doubly linked cell chain
//! - project: Screen coordinates for the cells inside the viewport
//! - Viewport / Margins: Scrolling and the navigable rectangle
//! - EditorCore: Session state machine, one key at a time
//! - EditorSnapshot: Deterministic state for parity testing

extern crate alloc;

pub mod alloc_guard;
pub mod cell_store;
pub mod clipboard;
pub mod core;
pub mod cursor;
pub mod key;
pub mod margins;
pub mod mode;
pub mod projector;
pub mod snapshot;
pub mod viewport;

pub use cell_store::{CellId, CellStore, Position};
pub use clipboard::{ClipOp, Clipboard, Selection};
pub use self::core::{CoreConfig, CoreIoRequest, CoreOutcome, EditorCore};
pub use key::Key;
pub use margins::Margins;
pub use mode::{EditorMode, ModeCommand};
pub use projector::Projection;
pub use snapshot::EditorSnapshot;
pub use viewport::Viewport;
