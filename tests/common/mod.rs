//! Common test infrastructure for the dialog binding tests:
//! - a scripted fake toolkit that records calls and parks tokens until
//!   the test resolves them
//! - host-window stand-ins and registry helpers
//! - a QuickJS context with the `dialog` module installed

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;

use perch_dialogs::toolkit::{
    CallbackToken, MessageBoxType, NativeWindowHandle, SelectFileDialogHandle, SelectFileListener,
    SelectFilePolicy, SelectFileRequest, Toolkit,
};
use perch_dialogs::window::{HostWindow, WindowRegistry};
use perch_dialogs::DialogBindings;
use rquickjs::{Context, Runtime};

// ─── Fake toolkit ───────────────────────────────────────────────────────────

/// One recorded message-box invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBoxCall {
    pub box_type: MessageBoxType,
    pub buttons: Vec<String>,
    pub title: String,
    pub message: String,
    pub detail: String,
}

/// A select-file request the fake toolkit is still holding the token for.
pub struct PendingRequest {
    pub request: SelectFileRequest,
    pub listener: Rc<dyn SelectFileListener>,
    pub token: CallbackToken,
}

#[derive(Default)]
struct FakeDialogState {
    pending: RefCell<Vec<PendingRequest>>,
    requests: RefCell<Vec<SelectFileRequest>>,
    created: Cell<usize>,
}

/// Scripted stand-in for the native toolkit.
///
/// Message boxes return a configured index; select-file requests are
/// parked (request + listener + token) until the test completes or
/// cancels them, in FIFO order.
#[derive(Default)]
pub struct FakeToolkit {
    message_box_result: Cell<i32>,
    message_box_calls: RefCell<Vec<MessageBoxCall>>,
    dialogs: Rc<FakeDialogState>,
}

impl FakeToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_message_box_result(&self, index: i32) {
        self.message_box_result.set(index);
    }

    pub fn message_box_calls(&self) -> Vec<MessageBoxCall> {
        self.message_box_calls.borrow().clone()
    }

    /// How many select-file dialogs were created.
    pub fn dialogs_created(&self) -> usize {
        self.dialogs.created.get()
    }

    /// Every select-file request seen, in order.
    pub fn requests(&self) -> Vec<SelectFileRequest> {
        self.dialogs.requests.borrow().clone()
    }

    pub fn last_request(&self) -> SelectFileRequest {
        self.dialogs
            .requests
            .borrow()
            .last()
            .cloned()
            .expect("a select-file request was issued")
    }

    /// Tokens the toolkit currently owns (outstanding requests).
    pub fn outstanding_tokens(&self) -> usize {
        self.dialogs.pending.borrow().len()
    }

    /// Resolve the oldest pending request with a single path.
    pub fn complete_single(&self, path: &str, filter_index: i64) {
        let pending = self.take_oldest();
        pending
            .listener
            .file_selected(PathBuf::from(path), filter_index, pending.token);
    }

    /// Resolve the oldest pending request with several paths.
    pub fn complete_multi(&self, paths: &[&str]) {
        let pending = self.take_oldest();
        pending
            .listener
            .multi_files_selected(paths.iter().map(PathBuf::from).collect(), pending.token);
    }

    /// Cancel the oldest pending request.
    pub fn cancel(&self) {
        let pending = self.take_oldest();
        pending.listener.file_selection_canceled(pending.token);
    }

    fn take_oldest(&self) -> PendingRequest {
        let mut pending = self.dialogs.pending.borrow_mut();
        assert!(!pending.is_empty(), "no pending select-file request");
        pending.remove(0)
    }
}

impl Toolkit for FakeToolkit {
    fn show_message_box(
        &self,
        box_type: MessageBoxType,
        buttons: &[String],
        title: &str,
        message: &str,
        detail: &str,
    ) -> i32 {
        self.message_box_calls.borrow_mut().push(MessageBoxCall {
            box_type,
            buttons: buttons.to_vec(),
            title: title.to_string(),
            message: message.to_string(),
            detail: detail.to_string(),
        });
        self.message_box_result.get()
    }

    fn create_select_file_dialog(
        &self,
        listener: Rc<dyn SelectFileListener>,
        _policy: Option<Rc<dyn SelectFilePolicy>>,
    ) -> Rc<dyn SelectFileDialogHandle> {
        self.dialogs.created.set(self.dialogs.created.get() + 1);
        Rc::new(FakeDialogHandle {
            listener,
            state: Rc::clone(&self.dialogs),
        })
    }
}

struct FakeDialogHandle {
    listener: Rc<dyn SelectFileListener>,
    state: Rc<FakeDialogState>,
}

impl SelectFileDialogHandle for FakeDialogHandle {
    fn select_file(&self, request: SelectFileRequest, token: CallbackToken) {
        self.state.requests.borrow_mut().push(request.clone());
        self.state.pending.borrow_mut().push(PendingRequest {
            request,
            listener: Rc::clone(&self.listener),
            token,
        });
    }
}

// ─── Window fixtures ────────────────────────────────────────────────────────

/// Host window stand-in whose native handle can be torn down mid-test.
pub struct TestWindow {
    handle: Cell<Option<NativeWindowHandle>>,
}

impl TestWindow {
    pub fn new(raw: u64) -> Rc<Self> {
        Rc::new(Self {
            handle: Cell::new(Some(NativeWindowHandle(raw))),
        })
    }

    /// Simulate native window destruction.
    pub fn close(&self) {
        self.handle.set(None);
    }
}

impl HostWindow for TestWindow {
    fn native_window_handle(&self) -> Option<NativeWindowHandle> {
        self.handle.get()
    }
}

// ─── Harness ────────────────────────────────────────────────────────────────

/// A QuickJS context with the `dialog` module installed over the fake
/// toolkit.
pub struct DialogHarness {
    pub toolkit: Rc<FakeToolkit>,
    pub windows: Rc<WindowRegistry>,
    pub bindings: DialogBindings,
    context: Context,
    _runtime: Runtime,
}

impl DialogHarness {
    pub fn new() -> Self {
        let runtime = Runtime::new().expect("create QuickJS runtime");
        let context = Context::full(&runtime).expect("create QuickJS context");

        let toolkit = Rc::new(FakeToolkit::new());
        let windows = Rc::new(WindowRegistry::new());
        let bindings =
            DialogBindings::new(Rc::clone(&toolkit) as Rc<dyn Toolkit>, Rc::clone(&windows));

        context
            .with(|ctx| bindings.install(&ctx))
            .expect("install dialog bindings");

        Self {
            toolkit,
            windows,
            bindings,
            context,
            _runtime: runtime,
        }
    }

    /// A harness with one registered window: id 1, native handle 0x77.
    pub fn with_window() -> (Self, Rc<TestWindow>) {
        let harness = Self::new();
        let window = TestWindow::new(0x77);
        harness.register_window(1, &window);
        (harness, window)
    }

    pub fn register_window(&self, id: u32, window: &Rc<TestWindow>) {
        let as_host: Rc<dyn HostWindow> = Rc::clone(window) as Rc<dyn HostWindow>;
        self.windows.register(id, &as_host);
    }

    /// Run a script for its side effects.
    pub fn run(&self, source: &str) {
        self.context
            .with(|ctx| ctx.eval::<(), _>(source))
            .expect("eval script");
    }

    /// Evaluate a script to a string.
    pub fn eval_str(&self, source: &str) -> String {
        self.context
            .with(|ctx| ctx.eval::<String, _>(source))
            .expect("eval string")
    }

    /// Evaluate a script to an i32.
    pub fn eval_i32(&self, source: &str) -> i32 {
        self.context
            .with(|ctx| ctx.eval::<i32, _>(source))
            .expect("eval number")
    }

    /// Evaluate inside try/catch; returns `"ok"` or `String(error)`.
    pub fn eval_catch(&self, source: &str) -> String {
        let wrapped = format!(
            "(() => {{ try {{ {source}; return 'ok'; }} catch (err) {{ return String(err); }} }})()"
        );
        self.eval_str(&wrapped)
    }

    /// `JSON.stringify` an expression and parse it back.
    pub fn eval_json(&self, source: &str) -> serde_json::Value {
        let text = self.eval_str(&format!("JSON.stringify({source})"));
        serde_json::from_str(&text).expect("valid JSON from script")
    }

    /// Deliver queued completions to the script.
    pub fn drain(&self) -> usize {
        self.context
            .with(|ctx| self.bindings.drain_completions(&ctx))
            .expect("drain completions")
    }

    /// Install an event recorder: a global `fd` dialog plus a global
    /// `events` list collecting `[name, ...payload]` tuples.
    pub fn script_recorder(&self) {
        self.run(
            r"
            globalThis.events = [];
            globalThis.fd = new dialog.FileDialog();
            fd.on('selected', (...args) => events.push(['selected', ...args]));
            fd.on('cancelled', (...args) => events.push(['cancelled', ...args]));
            ",
        );
    }
}
