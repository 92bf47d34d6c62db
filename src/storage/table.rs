//! The append-only log table in the SavvyCAN-compatible CSV layout.
//!
//! One table per run. The header row is written and flushed when the table is
//! created; every row after it describes one [`LogRecord`]:
//!
//! ```text
//! Time Stamp,ID,Extended,Dir,Bus,LEN,D1,D2,D3,D4,D5,D6,D7,D8,Interface
//! 1.000000,00000123,false,Rx,11,3,01,02,03,00,00,00,00,00,CAN1->CAN3
//! ```
//!
//! A row is rendered to a complete line before it reaches the sink buffer, so
//! an append that fails leaves no bytes behind and the next row starts on a
//! fresh line.

use std::io::{BufWriter, Write};

use chrono::NaiveDateTime;
use csv::{StringRecord, Terminator, WriterBuilder};

use crate::Result;
use crate::can::MAX_DATA_LEN;
use crate::config::TABLE_PREFIX;
use crate::record::LogRecord;

/// Header row of every log table.
pub const HEADER: [&str; 15] = [
    "Time Stamp",
    "ID",
    "Extended",
    "Dir",
    "Bus",
    "LEN",
    "D1",
    "D2",
    "D3",
    "D4",
    "D5",
    "D6",
    "D7",
    "D8",
    "Interface",
];

/// Direction column value; every logged frame is recorded as received.
pub const DIRECTION_RX: &str = "Rx";

/// Data column value past the declared length.
pub const PAD_BYTE: &str = "00";

/// File name of a table created at `created`, e.g.
/// `can_bridge_20240131_235959.csv`.
pub fn table_name(created: NaiveDateTime) -> String {
    format!("{TABLE_PREFIX}_{}.csv", created.format("%Y%m%d_%H%M%S"))
}

/// Microseconds as seconds with a six-digit fraction.
#[inline]
pub fn format_timestamp(timestamp_us: u64) -> String {
    format!("{}.{:06}", timestamp_us / 1_000_000, timestamp_us % 1_000_000)
}

/// Render one table row for `record`.
pub fn render_row(record: &LogRecord) -> StringRecord {
    let frame = &record.frame;
    let len = frame.data_len() as usize;

    let mut row = StringRecord::with_capacity(64, HEADER.len());
    row.push_field(&format_timestamp(record.timestamp_us));
    row.push_field(&format!("{:08x}", frame.raw_id()));
    row.push_field(if embedded_can::Frame::is_extended(frame) {
        "true"
    } else {
        "false"
    });
    row.push_field(DIRECTION_RX);
    row.push_field(&record.source.to_string());
    row.push_field(&len.to_string());
    for i in 0..MAX_DATA_LEN {
        if i < len {
            row.push_field(&format!("{:02X}", frame.byte(i)));
        } else {
            row.push_field(PAD_BYTE);
        }
    }
    row.push_field(record.source.label());
    row
}

/// An open log table.
pub struct LogTable<W: Write> {
    name: String,
    line: WriterBuilder,
    sink: BufWriter<W>,
    rows: u64,
}

impl<W: Write> LogTable<W> {
    /// Start a table on `sink`: writes and flushes the header row.
    pub fn new(name: impl Into<String>, sink: W) -> Result<Self> {
        let mut line = WriterBuilder::new();
        line.has_headers(false).terminator(Terminator::Any(b'\n'));

        let mut table = Self {
            name: name.into(),
            line,
            sink: BufWriter::new(sink),
            rows: 0,
        };
        let header = table.encode(HEADER)?;
        table.sink.write_all(&header)?;
        table.sink.flush()?;
        Ok(table)
    }

    /// Table (file) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append one row. The row may stay buffered until the next flush.
    ///
    /// On error nothing of the row was buffered.
    pub fn append(&mut self, record: &LogRecord) -> Result<()> {
        let line = self.encode(&render_row(record))?;
        self.sink.write_all(&line)?;
        self.rows += 1;
        Ok(())
    }

    /// Push buffered rows to the underlying sink. Rows that did not make it
    /// stay buffered for the next attempt.
    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush()?;
        Ok(())
    }

    /// Data rows appended so far (excluding the header).
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// The underlying sink. Only flushed rows are visible through it.
    pub fn get_ref(&self) -> &W {
        self.sink.get_ref()
    }

    /// One terminated CSV line.
    fn encode<I, T>(&self, fields: I) -> Result<Vec<u8>>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let mut line = self.line.from_writer(Vec::with_capacity(96));
        line.write_record(fields)?;
        line.into_inner().map_err(|e| e.into_error().into())
    }
}
