//! Perch dialogs - native dialog bindings for the Perch shell's
//! embedded QuickJS scripting runtime.
//!
//! This library is the boundary layer between shell scripts and the
//! native dialog toolkit, a Rust port of the shell's original C++
//! dialog API layer:
//! - `dialog.showMessageBox(...)`: synchronous modal message box,
//!   returning the chosen button index.
//! - `new dialog.FileDialog()`: asynchronous file selection, completed
//!   by `selected` / `cancelled` events correlated by a caller-chosen id.
//!
//! The toolkit is consumed through the traits in [`toolkit`]; the shell
//! wires the real implementation at startup. Nothing here renders a
//! dialog, owns a window, or decides when to prompt.
//!
//! Everything runs on the host's main thread: entry points are invoked
//! from script, toolkit completions are queued by listeners and handed
//! back to script by [`DialogBindings::drain_completions`] on the
//! shell's event loop tick.

#![forbid(unsafe_code)]
#![allow(
    clippy::must_use_candidate,
    clippy::doc_markdown,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

pub mod dialogs_js;
pub mod error;
pub mod message_box;
pub mod select_file;
pub mod toolkit;
pub mod window;

pub use dialogs_js::DialogBindings;
pub use error::{Error, Result};
