//! Toolkit-facing types and traits.
//!
//! The bridge renders nothing itself. Everything user-visible goes through
//! the native toolkit, consumed through the traits in this module; the
//! shell wires the real implementation at startup and tests substitute a
//! scripted fake.

use std::path::PathBuf;
use std::rc::Rc;

/// Severity/icon class of a message box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageBoxType {
    None,
    Information,
    Warning,
    Error,
    Question,
}

impl MessageBoxType {
    /// Decode the integer code used on the scripting wire.
    #[must_use]
    pub const fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            0 => Some(Self::None),
            1 => Some(Self::Information),
            2 => Some(Self::Warning),
            3 => Some(Self::Error),
            4 => Some(Self::Question),
            _ => None,
        }
    }
}

/// Kind of file-selection dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogType {
    OpenFile,
    OpenMultiFile,
    OpenFolder,
    Save,
}

impl DialogType {
    /// Decode the integer code used on the scripting wire.
    #[must_use]
    pub const fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            0 => Some(Self::OpenFile),
            1 => Some(Self::OpenMultiFile),
            2 => Some(Self::OpenFolder),
            3 => Some(Self::Save),
            _ => None,
        }
    }
}

/// UTF-16 code units for toolkit APIs that demand wide strings.
pub type WideString = Vec<u16>;

/// Convert host UTF-8 text to the toolkit's wide form.
#[must_use]
pub fn to_wide(text: &str) -> WideString {
    text.encode_utf16().collect()
}

/// Filter table handed to the toolkit.
///
/// `description_overrides` and `extensions` are parallel lists:
/// `extensions[i]` is the group named by `description_overrides[i]`.
/// Extensions are raw, no leading dot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTypeInfo {
    pub include_all_files: bool,
    pub support_drive: bool,
    pub description_overrides: Vec<WideString>,
    pub extensions: Vec<Vec<String>>,
}

/// Opaque handle to a shell window, as the toolkit sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeWindowHandle(pub u64);

/// Correlation value that rides through the toolkit with one request.
///
/// Deliberately neither `Clone` nor `Copy`. The toolkit owns the token
/// while the request is outstanding and hands it back in exactly one
/// completion callback, where [`CallbackToken::into_id`] consumes it.
#[derive(Debug, PartialEq, Eq)]
pub struct CallbackToken {
    id: i64,
}

impl CallbackToken {
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self { id }
    }

    #[must_use]
    pub const fn id(&self) -> i64 {
        self.id
    }

    /// Consume the token, releasing it.
    #[must_use]
    pub fn into_id(self) -> i64 {
        self.id
    }
}

/// One file-selection request in the form the toolkit consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectFileRequest {
    pub dialog_type: DialogType,
    pub title: WideString,
    pub default_path: PathBuf,
    /// `None` when the host supplied no filters.
    pub file_types: Option<FileTypeInfo>,
    /// Initially active filter, in the toolkit's own convention
    /// (1-based; 0 selects none). Out-of-range values are clamped by the
    /// toolkit, not here.
    pub file_type_index: i64,
    pub default_extension: String,
    /// Borrowed for this call only. If the window dies while the dialog
    /// is up, the outcome is the toolkit's to decide (normally
    /// cancellation).
    pub owning_window: NativeWindowHandle,
}

/// Completion callbacks a select-file dialog delivers on the main thread.
///
/// Each callback returns the [`CallbackToken`] the request was issued
/// with; exactly one of the three fires per request.
pub trait SelectFileListener {
    fn file_selected(&self, path: PathBuf, filter_index: i64, token: CallbackToken);
    fn multi_files_selected(&self, paths: Vec<PathBuf>, token: CallbackToken);
    fn file_selection_canceled(&self, token: CallbackToken);
}

/// Gate the toolkit may consult before showing a dialog.
pub trait SelectFilePolicy {
    fn can_open_select_file_dialog(&self) -> bool;
}

/// One native select-file dialog bound to a listener for its lifetime.
pub trait SelectFileDialogHandle {
    /// Hand one request to the toolkit. Must not block; the completion
    /// arrives later through the listener.
    fn select_file(&self, request: SelectFileRequest, token: CallbackToken);
}

/// The native UI toolkit surface the bridge consumes.
pub trait Toolkit {
    /// Modal message box. Blocks until dismissed and always yields an
    /// index: a button index in `[0, buttons.len())`, or the toolkit's
    /// dismissal sentinel when the box is closed without a choice.
    fn show_message_box(
        &self,
        box_type: MessageBoxType,
        buttons: &[String],
        title: &str,
        message: &str,
        detail: &str,
    ) -> i32;

    fn create_select_file_dialog(
        &self,
        listener: Rc<dyn SelectFileListener>,
        policy: Option<Rc<dyn SelectFilePolicy>>,
    ) -> Rc<dyn SelectFileDialogHandle>;
}
