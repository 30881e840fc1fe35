use crate::record::{Record, Severity, TimestampMode};
use std::io;
use std::sync::{Arc, Mutex};

/// Shared, ordered record sequence of one severity channel.
pub type ChannelRecords = Arc<Mutex<Vec<Record>>>;

/// Byte sink that turns each flushed chunk of text into one [`Record`].
///
/// Writes only buffer; `flush` appends the buffered text (possibly empty) as
/// a record to the channel it is bound to. A channel owns two of these sinks,
/// one for stdout-style and one for stderr-style output.
pub struct RecordSink {
    severity: Severity,
    mode: TimestampMode,
    buffer: Vec<u8>,
    records: ChannelRecords,
}

impl RecordSink {
    pub fn new(severity: Severity, mode: TimestampMode, records: ChannelRecords) -> Self {
        Self {
            severity,
            mode,
            buffer: Vec::new(),
            records,
        }
    }
}

impl io::Write for RecordSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let chunk = std::mem::take(&mut self.buffer);
        let message = String::from_utf8_lossy(&chunk).into_owned();
        let record = Record::new(message, self.severity, self.mode);
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn one_record_per_flush() {
        let records = ChannelRecords::default();
        let mut sink = RecordSink::new(Severity::Info, TimestampMode::EpochMillis, Arc::clone(&records));

        sink.write_all(b"hello ").unwrap();
        sink.write_all(b"world").unwrap();
        sink.flush().unwrap();
        sink.flush().unwrap();

        let records = records.lock().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message, "hello world");
        assert_eq!(records[0].severity, Severity::Info);
        assert_eq!(records[1].message, "");
    }
}
