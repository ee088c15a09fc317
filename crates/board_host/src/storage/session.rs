//! Sequential session record stream shared by every window persisting into one session file.

use std::{
    collections::VecDeque,
    io::{BufRead, Write},
};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Version for [`SessionRecord`] envelope serialization.
pub const SESSION_RECORD_ENVELOPE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Versioned envelope for one structured record in a session stream.
pub struct SessionRecord {
    /// Envelope schema version.
    pub envelope_version: u32,
    /// Record kind, checked by the reader before decoding the payload.
    pub key: String,
    /// Serialized record payload.
    pub payload: Value,
}

impl SessionRecord {
    /// Creates a record stamped with the current envelope version.
    pub fn new(key: impl Into<String>, payload: Value) -> Self {
        Self {
            envelope_version: SESSION_RECORD_ENVELOPE_VERSION,
            key: key.into(),
            payload,
        }
    }
}

/// Opaque sequential read/write handle for session records.
///
/// Records are consumed in the order they were written; readers must read exactly as many
/// records as the matching writer wrote to keep the cursor aligned for later windows.
pub trait SessionRecordStream {
    /// Appends one record.
    fn write_record(&mut self, record: &SessionRecord) -> Result<(), String>;

    /// Reads the next record, or `None` at end of stream.
    fn read_record(&mut self) -> Result<Option<SessionRecord>, String>;
}

#[derive(Debug, Clone, Default)]
/// In-memory FIFO record stream.
pub struct MemoryRecordStream {
    records: VecDeque<SessionRecord>,
    fail_writes: bool,
}

impl MemoryRecordStream {
    /// Makes every subsequent write fail, simulating an unwritable session file.
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Appends a record directly, bypassing write failure injection.
    pub fn push(&mut self, record: SessionRecord) {
        self.records.push_back(record);
    }

    /// Returns the records not yet read.
    pub fn pending(&self) -> impl Iterator<Item = &SessionRecord> {
        self.records.iter()
    }

    /// Returns the number of records not yet read.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` when no records remain.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl SessionRecordStream for MemoryRecordStream {
    fn write_record(&mut self, record: &SessionRecord) -> Result<(), String> {
        if self.fail_writes {
            return Err("session stream is not writable".to_string());
        }
        self.records.push_back(record.clone());
        Ok(())
    }

    fn read_record(&mut self) -> Result<Option<SessionRecord>, String> {
        Ok(self.records.pop_front())
    }
}

/// Write half of a JSON-lines session file (one record per line).
pub struct JsonLinesRecordWriter<W: Write> {
    inner: W,
}

impl<W: Write> JsonLinesRecordWriter<W> {
    /// Wraps a writer.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Flushes and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error when the final flush fails.
    pub fn into_inner(mut self) -> Result<W, String> {
        self.inner.flush().map_err(|e| e.to_string())?;
        Ok(self.inner)
    }
}

impl<W: Write> SessionRecordStream for JsonLinesRecordWriter<W> {
    fn write_record(&mut self, record: &SessionRecord) -> Result<(), String> {
        let line = serde_json::to_string(record).map_err(|e| e.to_string())?;
        writeln!(self.inner, "{line}").map_err(|e| e.to_string())
    }

    fn read_record(&mut self) -> Result<Option<SessionRecord>, String> {
        Err("session stream is write-only".to_string())
    }
}

/// Read half of a JSON-lines session file.
pub struct JsonLinesRecordReader<R: BufRead> {
    inner: R,
}

impl<R: BufRead> JsonLinesRecordReader<R> {
    /// Wraps a buffered reader.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: BufRead> SessionRecordStream for JsonLinesRecordReader<R> {
    fn write_record(&mut self, _record: &SessionRecord) -> Result<(), String> {
        Err("session stream is read-only".to_string())
    }

    fn read_record(&mut self) -> Result<Option<SessionRecord>, String> {
        let mut line = String::new();
        loop {
            line.clear();
            let read = self.inner.read_line(&mut line).map_err(|e| e.to_string())?;
            if read == 0 {
                return Ok(None);
            }
            if !line.trim().is_empty() {
                break;
            }
        }
        serde_json::from_str(line.trim_end()).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn session_record_serialization_shape_is_stable() {
        let record = SessionRecord::new("view_state", json!({"visible": true}));
        let value = serde_json::to_value(&record).expect("serialize record");
        let object = value.as_object().expect("object");
        assert_eq!(object.get("envelope_version"), Some(&json!(1)));
        assert_eq!(object.get("key"), Some(&json!("view_state")));
        assert_eq!(object.get("payload"), Some(&json!({"visible": true})));
    }

    #[test]
    fn memory_stream_reads_in_write_order_then_reports_end() {
        let mut stream = MemoryRecordStream::default();
        stream
            .write_record(&SessionRecord::new("a", json!(1)))
            .expect("write a");
        stream
            .write_record(&SessionRecord::new("b", json!(2)))
            .expect("write b");

        assert_eq!(stream.len(), 2);
        assert_eq!(stream.read_record().expect("read").map(|r| r.key), Some("a".into()));
        assert_eq!(stream.read_record().expect("read").map(|r| r.key), Some("b".into()));
        assert_eq!(stream.read_record().expect("read"), None);
    }

    #[test]
    fn memory_stream_write_failure_leaves_stream_unchanged() {
        let mut stream = MemoryRecordStream::default();
        stream.fail_writes(true);
        let err = stream
            .write_record(&SessionRecord::new("a", json!(1)))
            .expect_err("write should fail");
        assert!(err.contains("not writable"));
        assert!(stream.is_empty());
    }

    #[test]
    fn json_lines_stream_round_trips_through_bytes() {
        let mut writer = JsonLinesRecordWriter::new(Vec::new());
        writer
            .write_record(&SessionRecord::new("first", json!({"n": 1})))
            .expect("write first");
        writer
            .write_record(&SessionRecord::new("second", json!("text")))
            .expect("write second");
        let bytes = writer.into_inner().expect("flush");

        let mut reader = JsonLinesRecordReader::new(Cursor::new(bytes));
        let first = reader.read_record().expect("read").expect("present");
        let second = reader.read_record().expect("read").expect("present");
        assert_eq!(first.payload, json!({"n": 1}));
        assert_eq!(second.key, "second");
        assert_eq!(reader.read_record().expect("read"), None);
    }

    #[test]
    fn json_lines_reader_rejects_malformed_line() {
        let mut reader = JsonLinesRecordReader::new(Cursor::new(b"{not json}\n".to_vec()));
        assert!(reader.read_record().is_err());
    }
}
