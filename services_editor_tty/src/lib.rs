//! # Terminal Editor Service
//!
//! Hosts an `editor_core` session on a real or scripted terminal.
//!
//! ## Philosophy
//!
//! - **Core stays pure**: All editing happens in `EditorCore`; this crate
//!   only moves keys in and frames out
//! - **Explicit IO**: Files are read and written through an `EditorIo`
//!   collaborator when the core asks for it
//! - **Testable**: `ScriptedTerminal` and `MemoryEditorIo` run whole
//!   sessions without a tty or a filesystem
//!
//! ## Design
//!
//! - `Editor::run` is a single-threaded loop: check the resize flag, draw,
//!   read one event, dispatch it
//! - Prompts (file name, yes/no) are nested read loops on the same terminal
//! - Rendering produces a `Frame`; backends decide how to paint it

pub mod config;
pub mod editor;
pub mod input_script;
pub mod io;
pub mod render;
pub mod terminal;

pub use config::{ConfigError, EditorConfig};
pub use editor::{Editor, EditorAction, EditorError, EditorResult};
pub use input_script::{InputScript, InputScriptError, ScriptedInput};
pub use io::{EditorIo, FsEditorIo, IoError, MemoryEditorIo};
pub use render::{EditorView, Frame};
pub use terminal::{CrosstermTerminal, ResizeFlag, ScriptedTerminal, TermEvent, Terminal, TerminalError};
