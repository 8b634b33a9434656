//! MessageBox bridge.
//!
//! Stateless: decode the request, hand it to the toolkit's blocking
//! message-box call, give the chosen index back. Blocking is fine here —
//! the dialog is the only meaningful activity while it is up; callers
//! that need non-blocking behavior use the file-dialog pattern instead.

use crate::error::{Error, Result};
use crate::toolkit::{MessageBoxType, Toolkit};

/// One message-box invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBoxRequest {
    pub box_type: MessageBoxType,
    pub buttons: Vec<String>,
    pub title: String,
    pub message: String,
    pub detail: String,
}

impl MessageBoxRequest {
    /// Build a request from the wire form: raw type code plus text
    /// fields. Unknown type codes and empty button lists are rejected.
    pub fn new(
        raw_type: i64,
        buttons: Vec<String>,
        title: String,
        message: String,
        detail: String,
    ) -> Result<Self> {
        let box_type = MessageBoxType::from_raw(raw_type)
            .ok_or_else(|| Error::bad_argument(format!("unknown message box type {raw_type}")))?;
        if buttons.is_empty() {
            return Err(Error::bad_argument("buttons must not be empty"));
        }
        Ok(Self {
            box_type,
            buttons,
            title,
            message,
            detail,
        })
    }
}

/// Show a modal message box and block until it is dismissed.
///
/// Returns the 0-based index of the chosen button, or the toolkit's
/// dismissal sentinel verbatim when the box is closed without a choice.
pub fn show(toolkit: &dyn Toolkit, request: &MessageBoxRequest) -> i32 {
    tracing::debug!(
        event = "dialog.message_box.show",
        box_type = ?request.box_type,
        buttons = request.buttons.len(),
        "Showing message box"
    );
    let chosen = toolkit.show_message_box(
        request.box_type,
        &request.buttons,
        &request.title,
        &request.message,
        &request.detail,
    );
    tracing::debug!(
        event = "dialog.message_box.chosen",
        chosen,
        "Message box dismissed"
    );
    chosen
}
