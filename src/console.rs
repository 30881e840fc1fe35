//! Process-wide console surface.
//!
//! Every severity has exactly one bound [`Handler`]. Programs write through
//! the `console_*!` macros (or [`emit`]); the interceptor rebinds handlers for
//! the duration of an invocation.

use crate::format;
use crate::record::Severity;
use serde::Serialize;
use serde_json::Value;
use std::io::Write;
use std::sync::{Arc, OnceLock, RwLock};
use tracing::debug;

/// A console handler receives the raw arguments of one call.
pub type Handler = Arc<dyn Fn(&[Value]) + Send + Sync>;

static BINDINGS: OnceLock<RwLock<[Handler; 6]>> = OnceLock::new();

fn bindings() -> &'static RwLock<[Handler; 6]> {
    BINDINGS.get_or_init(|| RwLock::new(Severity::ALL.map(default_handler)))
}

/// Built-in handler: render the arguments and write one line to stdout, or to
/// stderr for `warn` and `error`.
pub fn default_handler(severity: Severity) -> Handler {
    Arc::new(move |args: &[Value]| {
        let line = format::render(severity, args);
        if severity.is_stderr() {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
        } else {
            let _ = writeln!(std::io::stdout().lock(), "{}", line);
        }
    })
}

/// Currently bound handler for `severity`.
pub fn handler(severity: Severity) -> Handler {
    let guard = bindings().read().unwrap_or_else(|e| e.into_inner());
    Arc::clone(&guard[severity.index()])
}

/// Bind `handler` to `severity`, returning the previously bound handler.
pub fn bind(severity: Severity, handler: Handler) -> Handler {
    let mut guard = bindings().write().unwrap_or_else(|e| e.into_inner());
    std::mem::replace(&mut guard[severity.index()], handler)
}

/// Restore the built-in handlers for every severity.
pub fn reset() {
    for severity in Severity::ALL {
        bind(severity, default_handler(severity));
    }
}

/// Dispatch one console call. The binding lock is released before the
/// handler runs.
pub fn emit(severity: Severity, args: &[Value]) {
    let handler = handler(severity);
    handler(args);
}

/// Convert any serializable value into a console argument.
///
/// Values that cannot be represented as JSON (e.g. maps with non-string
/// keys) render as `[<type name>]`.
pub fn arg<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        let type_name = std::any::type_name::<T>();
        debug!(type_name, error = %e, "console argument is not representable as json");
        Value::String(format!("[{}]", type_name))
    })
}

#[macro_export]
macro_rules! console_log {
    ($($arg:expr),* $(,)?) => {
        $crate::console::emit($crate::record::Severity::Log, &[$($crate::console::arg(&$arg)),*])
    };
}

#[macro_export]
macro_rules! console_debug {
    ($($arg:expr),* $(,)?) => {
        $crate::console::emit($crate::record::Severity::Debug, &[$($crate::console::arg(&$arg)),*])
    };
}

#[macro_export]
macro_rules! console_info {
    ($($arg:expr),* $(,)?) => {
        $crate::console::emit($crate::record::Severity::Info, &[$($crate::console::arg(&$arg)),*])
    };
}

#[macro_export]
macro_rules! console_warn {
    ($($arg:expr),* $(,)?) => {
        $crate::console::emit($crate::record::Severity::Warn, &[$($crate::console::arg(&$arg)),*])
    };
}

#[macro_export]
macro_rules! console_error {
    ($($arg:expr),* $(,)?) => {
        $crate::console::emit($crate::record::Severity::Error, &[$($crate::console::arg(&$arg)),*])
    };
}

#[macro_export]
macro_rules! console_dir {
    ($($arg:expr),* $(,)?) => {
        $crate::console::emit($crate::record::Severity::Dir, &[$($crate::console::arg(&$arg)),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;
    use std::sync::Mutex;

    #[test]
    #[serial]
    fn bind_returns_previous_and_emit_dispatches() {
        reset();
        let seen: Arc<Mutex<Vec<Vec<Value>>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let previous = bind(
            Severity::Warn,
            Arc::new(move |args: &[Value]| sink.lock().unwrap().push(args.to_vec())),
        );

        crate::console_warn!("careful", 3);
        crate::console_warn!();
        crate::console_log!("not captured by the warn handler");

        let calls = seen.lock().unwrap().clone();
        assert_eq!(calls, vec![vec![json!("careful"), json!(3)], vec![]]);

        bind(Severity::Warn, previous);
        reset();
    }

    #[test]
    #[serial]
    fn handler_may_emit_on_another_channel() {
        reset();
        let seen: Arc<Mutex<Vec<String>>> = Arc::default();
        let sink = Arc::clone(&seen);
        bind(
            Severity::Debug,
            Arc::new(move |args: &[Value]| sink.lock().unwrap().push(format::format_values(args))),
        );
        bind(
            Severity::Info,
            Arc::new(|args: &[Value]| emit(Severity::Debug, args)),
        );

        crate::console_info!("forwarded", json!({ "n": 1 }));
        assert_eq!(seen.lock().unwrap().as_slice(), ["forwarded { n: 1 }"]);
        reset();
    }

    #[test]
    fn arg_accepts_unsized_and_structured_values() {
        #[derive(Serialize)]
        struct Point {
            x: i32,
        }
        assert_eq!(arg("text"), json!("text"));
        assert_eq!(arg(&Point { x: 4 }), json!({ "x": 4 }));
        assert_eq!(arg(&[1, 2][..]), json!([1, 2]));
    }

    #[test]
    fn unrepresentable_arg_renders_type_name() {
        let mut pairs = std::collections::BTreeMap::new();
        pairs.insert((1u8, 2u8), 3u8);

        let value = arg(&pairs);
        let Value::String(text) = &value else {
            panic!("expected a string fallback, got {value:?}");
        };
        assert!(text.starts_with('[') && text.ends_with(']'), "{text}");
        assert!(text.contains("BTreeMap"), "{text}");
        assert_ne!(format::format_values(&[json!("pairs"), value.clone()]), "pairs null");
    }
}
