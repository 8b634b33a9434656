//! FileDialog bridge.
//!
//! One bridge owns one toolkit dialog handle for its whole life and keeps
//! no per-request state: the caller's `callback_id` rides through the
//! toolkit inside a [`CallbackToken`]. The listener turns each toolkit
//! completion into exactly one queued [`DialogCompletion`], which the
//! binding layer later delivers as a `selected` or `cancelled` event.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::rc::Rc;

use serde::Serialize;

use crate::toolkit::{
    to_wide, CallbackToken, DialogType, FileTypeInfo, NativeWindowHandle, SelectFileDialogHandle,
    SelectFileListener, SelectFileRequest, Toolkit,
};

/// One named filter group as the script supplies it. Extensions are raw,
/// no leading dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    pub description: String,
    pub extensions: Vec<String>,
}

/// A validated `selectFile` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectFileParams {
    pub owning_window: NativeWindowHandle,
    pub dialog_type: DialogType,
    pub title: String,
    pub default_path: String,
    pub filters: Vec<FileFilter>,
    pub file_type_index: i64,
    pub default_extension: String,
    pub callback_id: i64,
}

/// Event emitted on the bridge when a request completes.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DialogEvent {
    /// The user confirmed one or more paths.
    #[serde(rename_all = "camelCase")]
    Selected {
        callback_id: i64,
        paths: Vec<PathBuf>,
    },

    /// The user dismissed the dialog, or the toolkit could not show it.
    #[serde(rename_all = "camelCase")]
    Cancelled { callback_id: i64 },
}

impl DialogEvent {
    /// Name the script-side emitter fires.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Selected { .. } => "selected",
            Self::Cancelled { .. } => "cancelled",
        }
    }

    /// Flatten into the emitted payload list: `[callback_id, paths...]`.
    #[must_use]
    pub fn into_payload(self) -> Vec<serde_json::Value> {
        match self {
            Self::Selected { callback_id, paths } => {
                let mut payload = Vec::with_capacity(1 + paths.len());
                payload.push(serde_json::Value::from(callback_id));
                payload.extend(
                    paths
                        .into_iter()
                        .map(|path| serde_json::Value::String(path.to_string_lossy().into_owned())),
                );
                payload
            }
            Self::Cancelled { callback_id } => vec![serde_json::Value::from(callback_id)],
        }
    }
}

/// One completion waiting for delivery to the script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogCompletion {
    /// Which bridge instance emits the event.
    pub instance_id: u64,
    pub event: DialogEvent,
}

/// Queue shared between bridge listeners and the delivery pump.
pub type CompletionQueue = Rc<RefCell<VecDeque<DialogCompletion>>>;

/// Turns toolkit completions into queued events. One per bridge.
struct BridgeListener {
    instance_id: u64,
    completions: CompletionQueue,
}

impl BridgeListener {
    fn push(&self, event: DialogEvent) {
        self.completions.borrow_mut().push_back(DialogCompletion {
            instance_id: self.instance_id,
            event,
        });
    }
}

impl SelectFileListener for BridgeListener {
    fn file_selected(&self, path: PathBuf, _filter_index: i64, token: CallbackToken) {
        let callback_id = token.into_id();
        tracing::debug!(
            event = "dialog.select_file.selected",
            instance_id = self.instance_id,
            callback_id,
            "File selected"
        );
        self.push(DialogEvent::Selected {
            callback_id,
            paths: vec![path],
        });
    }

    fn multi_files_selected(&self, paths: Vec<PathBuf>, token: CallbackToken) {
        let callback_id = token.into_id();
        tracing::debug!(
            event = "dialog.select_file.multi_selected",
            instance_id = self.instance_id,
            callback_id,
            count = paths.len(),
            "Files selected"
        );
        self.push(DialogEvent::Selected { callback_id, paths });
    }

    fn file_selection_canceled(&self, token: CallbackToken) {
        let callback_id = token.into_id();
        tracing::debug!(
            event = "dialog.select_file.cancelled",
            instance_id = self.instance_id,
            callback_id,
            "Selection cancelled"
        );
        self.push(DialogEvent::Cancelled { callback_id });
    }
}

/// The stateful half of the binding: owns one toolkit dialog handle.
pub struct FileDialogBridge {
    handle: Rc<dyn SelectFileDialogHandle>,
}

impl FileDialogBridge {
    /// Create the toolkit dialog bound to this bridge's listener.
    pub fn new(toolkit: &dyn Toolkit, instance_id: u64, completions: CompletionQueue) -> Self {
        let listener = Rc::new(BridgeListener {
            instance_id,
            completions,
        });
        let handle = toolkit.create_select_file_dialog(listener, None);
        Self { handle }
    }

    /// Hand one request to the toolkit. Returns once the toolkit has
    /// accepted it; the completion arrives later through the queue.
    pub fn select_file(&self, params: SelectFileParams) {
        let SelectFileParams {
            owning_window,
            dialog_type,
            title,
            default_path,
            filters,
            file_type_index,
            default_extension,
            callback_id,
        } = params;

        tracing::debug!(
            event = "dialog.select_file.request",
            dialog_type = ?dialog_type,
            callback_id,
            filters = filters.len(),
            "Issuing select-file request"
        );

        let request = SelectFileRequest {
            dialog_type,
            title: to_wide(&title),
            default_path: PathBuf::from(default_path),
            file_types: build_file_type_info(&filters),
            file_type_index,
            default_extension,
            owning_window,
        };
        self.handle
            .select_file(request, CallbackToken::new(callback_id));
    }
}

/// Build the toolkit filter table; `None` when the host supplied no
/// filters. All-files and remote-drive support are always on.
#[must_use]
pub fn build_file_type_info(filters: &[FileFilter]) -> Option<FileTypeInfo> {
    if filters.is_empty() {
        return None;
    }

    let mut info = FileTypeInfo {
        include_all_files: true,
        support_drive: true,
        description_overrides: Vec::with_capacity(filters.len()),
        extensions: Vec::with_capacity(filters.len()),
    };
    for filter in filters {
        info.description_overrides.push(to_wide(&filter.description));
        info.extensions.push(filter.extensions.clone());
    }
    Some(info)
}
