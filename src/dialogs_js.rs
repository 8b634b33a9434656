//! QuickJS bindings for the dialog layer.
//!
//! Follows the shim pattern used across Perch's script bindings: JS-side
//! state (the emitter, the instance table) lives in a bridge script
//! evaluated at install time, Rust installs the plain `__dialog_*`
//! functions the shim calls, and completions queued by toolkit listeners
//! are delivered on the main thread by [`DialogBindings::drain_completions`],
//! which hands them to the shim's `__dialog_emit`.
//!
//! # Architecture
//!
//! ```text
//! Script                              Rust Host
//! ------                              ---------
//! dialog.showMessageBox(...)     -->  validate, toolkit message box,
//!   returns chosen index              blocks until dismissed
//!
//! new dialog.FileDialog()        -->  __dialog_create: toolkit dialog
//!                                     handle, instance registered
//! fd.selectFile(win, ...)        -->  __dialog_select_file: validate,
//!   returns undefined                 SelectFile(..., token)
//!
//! [shell event loop tick]        <--  toolkit completion queued
//!   drain_completions(ctx)
//!   __dialog_emit(id, name, payload)
//!   fd.emit('selected', cbId, path)
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use rquickjs::function::Func;
use rquickjs::{Array, Ctx, Exception, Function, IntoJs, Object, Value};

use crate::error::{Error, Result};
use crate::message_box::{self, MessageBoxRequest};
use crate::select_file::{
    CompletionQueue, DialogCompletion, FileDialogBridge, FileFilter, SelectFileParams,
};
use crate::toolkit::{DialogType, NativeWindowHandle, Toolkit};
use crate::window::WindowRegistry;

/// Live native bridges keyed by the instance id the shim stores on each
/// `FileDialog` object.
#[derive(Default)]
struct BridgeTable {
    next_id: u64,
    bridges: HashMap<u64, Rc<FileDialogBridge>>,
}

/// Installs and services the `dialog` module of a QuickJS context.
///
/// One instance per context. All entry points and
/// [`drain_completions`](Self::drain_completions) run on the host's main
/// thread; nothing here is `Send`.
pub struct DialogBindings {
    toolkit: Rc<dyn Toolkit>,
    windows: Rc<WindowRegistry>,
    bridges: Rc<RefCell<BridgeTable>>,
    completions: CompletionQueue,
}

impl DialogBindings {
    #[must_use]
    pub fn new(toolkit: Rc<dyn Toolkit>, windows: Rc<WindowRegistry>) -> Self {
        Self {
            toolkit,
            windows,
            bridges: Rc::default(),
            completions: Rc::default(),
        }
    }

    /// Number of completions queued and not yet delivered.
    #[must_use]
    pub fn pending_completions(&self) -> usize {
        self.completions.borrow().len()
    }

    /// Number of live `FileDialog` bridges.
    #[must_use]
    pub fn live_bridges(&self) -> usize {
        self.bridges.borrow().bridges.len()
    }

    /// Install the native entry points and the `dialog` shim into `ctx`.
    pub fn install(&self, ctx: &Ctx<'_>) -> rquickjs::Result<()> {
        let globals = ctx.globals();

        {
            let toolkit = Rc::clone(&self.toolkit);
            globals.set(
                "__dialog_show_message_box",
                Func::from(
                    move |ctx: Ctx<'_>, args: Array<'_>| -> rquickjs::Result<i32> {
                        match decode_message_box(&args) {
                            Ok(request) => Ok(message_box::show(toolkit.as_ref(), &request)),
                            Err(err) => Err(throw_dialog_error(&ctx, &err)),
                        }
                    },
                ),
            )?;
        }

        {
            let toolkit = Rc::clone(&self.toolkit);
            let bridges = Rc::clone(&self.bridges);
            let completions = Rc::clone(&self.completions);
            globals.set(
                "__dialog_create",
                Func::from(move || -> f64 {
                    let instance_id = {
                        let mut table = bridges.borrow_mut();
                        table.next_id += 1;
                        table.next_id
                    };
                    let bridge = FileDialogBridge::new(
                        toolkit.as_ref(),
                        instance_id,
                        Rc::clone(&completions),
                    );
                    bridges
                        .borrow_mut()
                        .bridges
                        .insert(instance_id, Rc::new(bridge));
                    tracing::debug!(
                        event = "dialog.bridge.created",
                        instance_id,
                        "FileDialog bridge created"
                    );
                    instance_id as f64
                }),
            )?;
        }

        {
            let windows = Rc::clone(&self.windows);
            let bridges = Rc::clone(&self.bridges);
            globals.set(
                "__dialog_select_file",
                Func::from(
                    move |ctx: Ctx<'_>,
                          instance: Value<'_>,
                          args: Array<'_>|
                          -> rquickjs::Result<()> {
                        let issued = resolve_bridge(&bridges, &instance).and_then(|bridge| {
                            let params = decode_select_file(&windows, &args)?;
                            bridge.select_file(params);
                            Ok(())
                        });
                        issued.map_err(|err| throw_dialog_error(&ctx, &err))
                    },
                ),
            )?;
        }

        {
            let bridges = Rc::clone(&self.bridges);
            globals.set(
                "__dialog_dispose",
                Func::from(move |instance_id: f64| {
                    let instance_id = instance_id as u64;
                    if bridges.borrow_mut().bridges.remove(&instance_id).is_some() {
                        tracing::debug!(
                            event = "dialog.bridge.disposed",
                            instance_id,
                            "FileDialog bridge disposed"
                        );
                    }
                }),
            )?;
        }

        ctx.eval::<(), _>(DIALOG_BRIDGE_JS)?;
        Ok(())
    }

    /// Deliver queued completions to the script.
    ///
    /// The shell's event loop calls this on the main thread each tick.
    /// Returns the number of events handed to the shim. Completions for
    /// instances the script has disposed are dropped with a warning.
    pub fn drain_completions(&self, ctx: &Ctx<'_>) -> rquickjs::Result<usize> {
        let mut delivered = 0;
        loop {
            let Some(completion) = self.completions.borrow_mut().pop_front() else {
                break;
            };
            self.deliver(ctx, completion)?;
            delivered += 1;
        }
        Ok(delivered)
    }

    fn deliver(&self, ctx: &Ctx<'_>, completion: DialogCompletion) -> rquickjs::Result<()> {
        let DialogCompletion { instance_id, event } = completion;
        let name = event.event_name();

        let payload = Array::new(ctx.clone())?;
        for (index, value) in event.into_payload().into_iter().enumerate() {
            payload.set(index, json_to_js(ctx, &value)?)?;
        }

        let emit_fn: Function<'_> = ctx.globals().get("__dialog_emit")?;
        let handled: bool = emit_fn.call((instance_id as f64, name, payload))?;
        if handled {
            tracing::debug!(
                event = "dialog.emit",
                instance_id,
                name,
                "Delivered dialog event"
            );
        } else {
            tracing::warn!(
                event = "dialog.emit.dropped",
                instance_id,
                name,
                "Completion for unknown dialog instance"
            );
        }
        Ok(())
    }
}

// ============================================================================
// Argument decoding
// ============================================================================

fn decode_message_box(args: &Array<'_>) -> Result<MessageBoxRequest> {
    let args = positional(args)?;
    let raw_type = int_arg(&args, 0)?; // type
    let buttons = string_vec_arg(&args, 1)?; // buttons
    let title = string_arg(&args, 2)?; // title
    let message = string_arg(&args, 3)?; // message
    let detail = string_arg(&args, 4)?; // detail
    MessageBoxRequest::new(raw_type, buttons, title, message, detail)
}

fn decode_select_file(windows: &WindowRegistry, args: &Array<'_>) -> Result<SelectFileParams> {
    let args = positional(args)?;
    let window = object_arg(&args, 0)?; // window
    let raw_type = int_arg(&args, 1)?; // type
    let title = string_arg(&args, 2)?; // title
    let default_path = string_arg(&args, 3)?; // default_path
    let filters = filters_arg(&args, 4)?; // file_types
    let file_type_index = int_arg(&args, 5)?; // file_type_index
    let default_extension = string_arg(&args, 6)?; // default_extension
    let callback_id = int_arg(&args, 7)?; // callback_id

    let owning_window = resolve_window(windows, window)?;
    let dialog_type = DialogType::from_raw(raw_type)
        .ok_or_else(|| Error::bad_argument(format!("unknown dialog type {raw_type}")))?;

    Ok(SelectFileParams {
        owning_window,
        dialog_type,
        title,
        default_path,
        filters,
        file_type_index,
        default_extension,
        callback_id,
    })
}

/// Unwrap the script-side window wrapper to a live native handle.
fn resolve_window(windows: &WindowRegistry, window: &Object<'_>) -> Result<NativeWindowHandle> {
    let id: u32 = window.get("id").map_err(|_| Error::InvalidWindow)?;
    windows.resolve(id).ok_or(Error::InvalidWindow)
}

fn resolve_bridge(
    bridges: &Rc<RefCell<BridgeTable>>,
    instance: &Value<'_>,
) -> Result<Rc<FileDialogBridge>> {
    let id = value_as_int(instance).ok_or_else(corrupted)?;
    let bridge = bridges.borrow().bridges.get(&(id as u64)).cloned();
    bridge.ok_or_else(corrupted)
}

fn corrupted() -> Error {
    Error::invalid_state("The FileDialog object is corrupted")
}

fn positional<'js>(args: &Array<'js>) -> Result<Vec<Value<'js>>> {
    args.iter::<Value<'js>>()
        .collect::<rquickjs::Result<Vec<_>>>()
        .map_err(|err| Error::bad_argument(format!("argument list: {err}")))
}

fn arg<'js, 'a>(args: &'a [Value<'js>], index: usize) -> Result<&'a Value<'js>> {
    args.get(index)
        .ok_or_else(|| Error::bad_argument(format!("missing argument {index}")))
}

fn value_as_int(value: &Value<'_>) -> Option<i64> {
    if let Some(int) = value.as_int() {
        Some(i64::from(int))
    } else if value.is_number() {
        Some(value.as_float().unwrap_or_default() as i64)
    } else {
        None
    }
}

fn int_arg(args: &[Value<'_>], index: usize) -> Result<i64> {
    let value = arg(args, index)?;
    value_as_int(value)
        .ok_or_else(|| Error::bad_argument(format!("argument {index} is not a number")))
}

fn string_arg(args: &[Value<'_>], index: usize) -> Result<String> {
    let value = arg(args, index)?;
    let Some(text) = value.as_string() else {
        return Err(Error::bad_argument(format!(
            "argument {index} is not a string"
        )));
    };
    text.to_string()
        .map_err(|err| Error::bad_argument(format!("argument {index}: {err}")))
}

fn array_arg<'js, 'a>(args: &'a [Value<'js>], index: usize) -> Result<&'a Array<'js>> {
    let value = arg(args, index)?;
    value
        .as_array()
        .ok_or_else(|| Error::bad_argument(format!("argument {index} is not an array")))
}

fn object_arg<'js, 'a>(args: &'a [Value<'js>], index: usize) -> Result<&'a Object<'js>> {
    let value = arg(args, index)?;
    value
        .as_object()
        .ok_or_else(|| Error::bad_argument(format!("argument {index} is not an object")))
}

fn string_vec_arg(args: &[Value<'_>], index: usize) -> Result<Vec<String>> {
    let array = array_arg(args, index)?;
    let mut items = Vec::with_capacity(array.len());
    for item in array.iter::<Value<'_>>() {
        let item = item.map_err(|err| Error::bad_argument(format!("argument {index}: {err}")))?;
        let Some(text) = item.as_string() else {
            return Err(Error::bad_argument(format!(
                "argument {index} holds a non-string element"
            )));
        };
        items.push(
            text.to_string()
                .map_err(|err| Error::bad_argument(format!("argument {index}: {err}")))?,
        );
    }
    Ok(items)
}

fn filters_arg(args: &[Value<'_>], index: usize) -> Result<Vec<FileFilter>> {
    let array = array_arg(args, index)?;
    let mut filters = Vec::with_capacity(array.len());
    for entry in array.iter::<Value<'_>>() {
        let entry = entry.map_err(|err| Error::bad_argument(format!("argument {index}: {err}")))?;
        let Some(entry) = entry.as_object() else {
            return Err(Error::bad_argument(format!(
                "argument {index} holds a non-object filter"
            )));
        };

        let description: String = entry
            .get("description")
            .map_err(|_| Error::bad_argument("filter description must be a string"))?;

        let extensions_value: Value<'_> = entry
            .get("extensions")
            .map_err(|_| Error::bad_argument("filter extensions must be an array"))?;
        let Some(extension_list) = extensions_value.as_array() else {
            return Err(Error::bad_argument("filter extensions must be an array"));
        };

        let mut extensions = Vec::with_capacity(extension_list.len());
        for extension in extension_list.iter::<Value<'_>>() {
            let extension = extension
                .map_err(|err| Error::bad_argument(format!("filter extensions: {err}")))?;
            let Some(extension) = extension.as_string() else {
                return Err(Error::bad_argument(
                    "filter extensions hold a non-string element",
                ));
            };
            extensions.push(
                extension
                    .to_string()
                    .map_err(|err| Error::bad_argument(format!("filter extensions: {err}")))?,
            );
        }

        filters.push(FileFilter {
            description,
            extensions,
        });
    }
    Ok(filters)
}

// ============================================================================
// Error and value conversion
// ============================================================================

/// Convert a bridge error into a thrown JS exception.
fn throw_dialog_error(ctx: &Ctx<'_>, err: &Error) -> rquickjs::Error {
    if let Error::BadArgument { detail } = err {
        tracing::debug!(
            event = "dialog.bad_argument",
            detail = %detail,
            "Rejected dialog call"
        );
        return Exception::throw_type(ctx, "Bad argument");
    }
    Exception::throw_message(ctx, &err.to_string())
}

/// Convert a `serde_json::Value` to a JS value.
fn json_to_js<'js>(ctx: &Ctx<'js>, value: &serde_json::Value) -> rquickjs::Result<Value<'js>> {
    match value {
        serde_json::Value::Null => Ok(Value::new_null(ctx.clone())),
        serde_json::Value::Bool(flag) => Ok(Value::new_bool(ctx.clone(), *flag)),
        serde_json::Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                match i32::try_from(int) {
                    Ok(small) => Ok(Value::new_int(ctx.clone(), small)),
                    Err(_) => Ok(Value::new_float(ctx.clone(), int as f64)),
                }
            } else if let Some(float) = number.as_f64() {
                Ok(Value::new_float(ctx.clone(), float))
            } else {
                Ok(Value::new_null(ctx.clone()))
            }
        }
        serde_json::Value::String(text) => text.as_str().into_js(ctx),
        serde_json::Value::Array(items) => {
            let array = Array::new(ctx.clone())?;
            for (index, item) in items.iter().enumerate() {
                array.set(index, json_to_js(ctx, item)?)?;
            }
            Ok(array.into_value())
        }
        serde_json::Value::Object(entries) => {
            let object = Object::new(ctx.clone())?;
            for (key, item) in entries {
                object.set(key.as_str(), json_to_js(ctx, item)?)?;
            }
            Ok(object.into_value())
        }
    }
}

// ============================================================================
// JS shim
// ============================================================================

/// Script-side half of the binding: instance table, emitter, and the
/// `dialog` module object.
const DIALOG_BRIDGE_JS: &str = r#"
// Dialog instances: instance_id -> FileDialog object
const __dialog_instances = new Map();

// Minimal multi-shot emitter; dialog completions are listener events,
// not promises.
class __DialogEventEmitter {
    constructor() {
        this.__listeners = new Map();
    }

    on(name, handler) {
        if (typeof handler !== 'function') {
            throw new TypeError('Bad argument');
        }
        if (!this.__listeners.has(name)) {
            this.__listeners.set(name, []);
        }
        this.__listeners.get(name).push({ handler, once: false });
        return this;
    }

    once(name, handler) {
        if (typeof handler !== 'function') {
            throw new TypeError('Bad argument');
        }
        if (!this.__listeners.has(name)) {
            this.__listeners.set(name, []);
        }
        this.__listeners.get(name).push({ handler, once: true });
        return this;
    }

    off(name, handler) {
        const entries = this.__listeners.get(name);
        if (entries) {
            const index = entries.findIndex((entry) => entry.handler === handler);
            if (index !== -1) {
                entries.splice(index, 1);
            }
        }
        return this;
    }

    listenerCount(name) {
        const entries = this.__listeners.get(name);
        return entries ? entries.length : 0;
    }

    emit(name, ...args) {
        const entries = this.__listeners.get(name);
        if (!entries || entries.length === 0) {
            return false;
        }
        for (const entry of entries.slice()) {
            if (entry.once) {
                this.off(name, entry.handler);
            }
            entry.handler(...args);
        }
        return true;
    }
}

function FileDialog() {
    if (new.target === undefined) {
        throw new Error('Require constructor call');
    }
    this.__listeners = new Map();
    this.__id = __dialog_create();
    __dialog_instances.set(this.__id, this);
}

FileDialog.prototype = Object.create(__DialogEventEmitter.prototype);
FileDialog.prototype.constructor = FileDialog;

FileDialog.prototype.selectFile = function (...args) {
    __dialog_select_file(this.__id, args);
};

FileDialog.prototype.dispose = function () {
    if (this.__id !== undefined && __dialog_instances.delete(this.__id)) {
        __dialog_dispose(this.__id);
    }
    this.__id = undefined;
};

// Called from Rust when a queued completion is delivered.
function __dialog_emit(instanceId, name, payload) {
    const instance = __dialog_instances.get(instanceId);
    if (!instance) {
        return false;
    }
    instance.emit(name, ...payload);
    return true;
}

globalThis.dialog = {
    showMessageBox(...args) {
        return __dialog_show_message_box(args);
    },
    FileDialog,
    OPEN_FILE: 0,
    OPEN_MULTI_FILE: 1,
    OPEN_FOLDER: 2,
    SAVE: 3,
};
"#;
