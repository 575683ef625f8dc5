//! JSON-lines output for the dbqueue CLI.
//!
//! Every record is written as one JSON object per line. Payloads that are valid
//! JSON are embedded verbatim; anything else is written as a (lossy) string.

use dbqueue::Record;
use serde::Serialize;
use serde_json::value::RawValue;
use std::io::Write;

#[derive(Serialize)]
struct RecordLine<'a> {
    id: i64,
    enqueued_at: String,
    visible_at: String,
    message: &'a RawValue,
}

pub struct JsonLinesWriter<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Write `records` and flush. I/O failures surface as `serde_json::Error`.
    pub fn write_records(&mut self, records: &[Record]) -> serde_json::Result<()> {
        for record in records {
            self.write_record(record)?;
        }
        self.out.flush().map_err(serde_json::Error::io)
    }

    fn write_record(&mut self, record: &Record) -> serde_json::Result<()> {
        let fallback;
        let message: &RawValue = match serde_json::from_slice::<&RawValue>(&record.message) {
            Ok(raw) => raw,
            Err(_) => {
                let text = String::from_utf8_lossy(&record.message);
                fallback = serde_json::value::to_raw_value(&text)?;
                &fallback
            }
        };

        let line = RecordLine {
            id: record.id,
            enqueued_at: record
                .enqueued_at
                .to_rfc3339_opts(chrono::SecondsFormat::Nanos, true),
            visible_at: record
                .visible_at
                .to_rfc3339_opts(chrono::SecondsFormat::Nanos, true),
            message,
        };
        serde_json::to_writer(&mut self.out, &line)?;
        self.out.write_all(b"\n").map_err(serde_json::Error::io)
    }
}
