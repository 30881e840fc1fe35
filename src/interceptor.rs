use crate::console::{self, Handler};
use crate::format;
use crate::record::{Record, Severity, TimestampMode};
use crate::sink::{ChannelRecords, RecordSink};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing::{debug, trace};

/// Installs shims on every console severity so that each call is captured as a
/// [`Record`] and still reaches the handler that was bound before.
///
/// Capture and pass-through happen inline on the calling thread; there is no
/// background task involved.
#[derive(Debug, Clone, Copy, Default)]
pub struct Interceptor {
    mode: TimestampMode,
}

impl Interceptor {
    pub fn new(mode: TimestampMode) -> Self {
        Self { mode }
    }

    /// Rebind every severity to a capturing shim.
    ///
    /// The returned [`ShimGuard`] owns the saved pass-through handlers and
    /// restores them on [`ShimGuard::uninstall`] or when dropped. Only one
    /// guard should be alive at a time.
    pub fn install(&self) -> ShimGuard {
        let mut channels = Vec::with_capacity(Severity::ALL.len());

        for severity in Severity::ALL {
            let records = ChannelRecords::default();
            let formatter = Arc::new(Mutex::new(ChannelFormatter::new(
                severity,
                self.mode,
                Arc::clone(&records),
            )));
            let passthrough = console::handler(severity);

            let forward = Arc::clone(&passthrough);
            let shim: Handler = Arc::new(move |args: &[Value]| {
                formatter
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .write(args);
                forward(args);
            });
            console::bind(severity, shim);

            channels.push(Channel {
                severity,
                passthrough,
                records,
            });
        }

        debug!(mode = ?self.mode, "console shims installed");
        ShimGuard { channels }
    }
}

/// Private formatter of one channel, writing into two record sinks.
struct ChannelFormatter {
    severity: Severity,
    out: RecordSink,
    err: RecordSink,
}

impl ChannelFormatter {
    fn new(severity: Severity, mode: TimestampMode, records: ChannelRecords) -> Self {
        Self {
            severity,
            out: RecordSink::new(severity, mode, Arc::clone(&records)),
            err: RecordSink::new(severity, mode, records),
        }
    }

    fn write(&mut self, args: &[Value]) {
        let text = format::render(self.severity, args);
        let sink = if self.severity.is_stderr() { &mut self.err } else { &mut self.out };
        if let Err(e) = sink.write_all(text.as_bytes()).and_then(|_| sink.flush()) {
            debug!(severity = %self.severity, error = %e, "failed to capture console call");
        }
        trace!(severity = %self.severity, len = text.len(), "captured console call");
    }
}

struct Channel {
    severity: Severity,
    passthrough: Handler,
    records: ChannelRecords,
}

/// Active shim installation.
pub struct ShimGuard {
    channels: Vec<Channel>,
}

impl ShimGuard {
    /// Restore the pass-through handlers and hand back every channel's records.
    pub fn uninstall(mut self) -> ChannelLogs {
        let channels = std::mem::take(&mut self.channels);
        restore(&channels);

        let mut logs = ChannelLogs::default();
        for channel in channels {
            let records = std::mem::take(&mut *channel.records.lock().unwrap_or_else(|e| e.into_inner()));
            logs.channels.insert(channel.severity, records);
        }
        debug!(records = logs.len(), "console shims removed");
        logs
    }
}

impl Drop for ShimGuard {
    fn drop(&mut self) {
        if !self.channels.is_empty() {
            restore(&self.channels);
            debug!("console shims restored on drop");
        }
    }
}

fn restore(channels: &[Channel]) {
    for channel in channels {
        console::bind(channel.severity, Arc::clone(&channel.passthrough));
    }
}

/// Captured records keyed by severity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelLogs {
    channels: BTreeMap<Severity, Vec<Record>>,
}

impl Default for ChannelLogs {
    fn default() -> Self {
        Self {
            channels: Severity::ALL.into_iter().map(|s| (s, Vec::new())).collect(),
        }
    }
}

impl ChannelLogs {
    pub fn get(&self, severity: Severity) -> &[Record] {
        self.channels.get(&severity).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of records across channels.
    pub fn len(&self) -> usize {
        self.channels.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten into the aggregated log: channels concatenated in registration
    /// order, each keeping its emission order.
    pub fn into_aggregated(self) -> Vec<Record> {
        self.channels.into_values().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{console_debug, console_dir, console_error, console_info, console_log, console_warn};
    use serde_json::json;
    use serial_test::serial;

    type Calls = Arc<Mutex<Vec<(Severity, Vec<Value>)>>>;

    /// Bind recording handlers as the "original" console.
    fn bind_recorders() -> Calls {
        let calls = Calls::default();
        for severity in Severity::ALL {
            let calls = Arc::clone(&calls);
            console::bind(
                severity,
                Arc::new(move |args: &[Value]| calls.lock().unwrap().push((severity, args.to_vec()))),
            );
        }
        calls
    }

    #[test]
    #[serial]
    fn every_call_is_captured_and_forwarded_once() {
        let calls = bind_recorders();
        let guard = Interceptor::default().install();

        console_log!("a", 1);
        console_error!("b", 2);
        console_log!("c");
        console_warn!();
        console_dir!(json!({ "k": "v" }), "ignored");
        console_debug!("d", json!([1, 2]));
        console_info!("%s=%d", "n", 7);

        let logs = guard.uninstall();
        console::reset();

        assert_eq!(logs.len(), 7);
        for severity in Severity::ALL {
            assert!(!logs.get(severity).is_empty(), "no record for {severity}");
            assert!(logs.get(severity).iter().all(|r| r.severity == severity));
        }
        let log: Vec<&str> = logs.get(Severity::Log).iter().map(|r| r.message.as_str()).collect();
        assert_eq!(log, ["a 1", "c"]);
        assert_eq!(logs.get(Severity::Error)[0].message, "b 2");
        assert_eq!(logs.get(Severity::Warn)[0].message, "");
        assert_eq!(logs.get(Severity::Dir)[0].message, "{ k: 'v' }");
        assert_eq!(logs.get(Severity::Debug)[0].message, "d [ 1, 2 ]");
        assert_eq!(logs.get(Severity::Info)[0].message, "n=7");

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 7);
        assert_eq!(calls[0], (Severity::Log, vec![json!("a"), json!(1)]));
        assert_eq!(calls[1], (Severity::Error, vec![json!("b"), json!(2)]));
        assert_eq!(calls[3], (Severity::Warn, vec![]));
        assert_eq!(calls[4], (Severity::Dir, vec![json!({ "k": "v" }), json!("ignored")]));
        assert_eq!(calls[5], (Severity::Debug, vec![json!("d"), json!([1, 2])]));
        assert_eq!(calls[6], (Severity::Info, vec![json!("%s=%d"), json!("n"), json!(7)]));
    }

    #[test]
    #[serial]
    fn uninstall_restores_original_handlers() {
        let calls = bind_recorders();
        let before: Vec<Handler> = Severity::ALL.iter().map(|s| console::handler(*s)).collect();

        let guard = Interceptor::default().install();
        console_info!("during");
        let logs = guard.uninstall();

        for (severity, original) in Severity::ALL.iter().zip(&before) {
            assert!(Arc::ptr_eq(&console::handler(*severity), original));
        }

        console_info!("after");
        assert_eq!(logs.len(), 1);
        assert_eq!(calls.lock().unwrap().len(), 2);
        console::reset();
    }

    #[test]
    #[serial]
    fn dropping_the_guard_restores_handlers() {
        let _calls = bind_recorders();
        let original = console::handler(Severity::Error);
        {
            let _guard = Interceptor::default().install();
            assert!(!Arc::ptr_eq(&console::handler(Severity::Error), &original));
        }
        assert!(Arc::ptr_eq(&console::handler(Severity::Error), &original));
        console::reset();
    }

    #[test]
    fn aggregation_follows_registration_order() {
        let mut logs = ChannelLogs::default();
        let mode = TimestampMode::EpochMillis;
        logs.channels.insert(Severity::Dir, vec![Record::new("d", Severity::Dir, mode)]);
        logs.channels.insert(
            Severity::Error,
            vec![Record::new("e1", Severity::Error, mode), Record::new("e2", Severity::Error, mode)],
        );
        logs.channels.insert(Severity::Log, vec![Record::new("l", Severity::Log, mode)]);

        let messages: Vec<String> = logs.into_aggregated().into_iter().map(|r| r.message).collect();
        assert_eq!(messages, ["l", "e1", "e2", "d"]);
    }

    #[test]
    fn default_logs_are_empty() {
        let logs = ChannelLogs::default();
        assert!(logs.is_empty());
        for severity in Severity::ALL {
            assert!(logs.get(severity).is_empty());
        }
    }
}
