use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::PosdetError;
use crate::message::Message;
use crate::packet::{Direction, MessageKind, RawMessage};

/// One frame seen on the host/hub link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedMessage {
    pub timestamp: DateTime<Utc>,
    pub direction: Direction,
    /// Encoded `MessageFrame`, hex in the log file
    #[serde(with = "hex_bytes")]
    pub frame: Vec<u8>,
}

impl CapturedMessage {
    pub fn new(timestamp: DateTime<Utc>, direction: Direction, frame: Vec<u8>) -> Self {
        Self {
            timestamp,
            direction,
            frame,
        }
    }

    /// Capture an outgoing or incoming message now.
    pub fn from_message(message: &Message) -> Self {
        Self::new(Utc::now(), message.direction(), message.encode().to_vec())
    }

    pub fn hex_string(&self) -> String {
        hex::encode(&self.frame)
    }

    pub fn raw(&self) -> Result<RawMessage, PosdetError> {
        RawMessage::try_from(Bytes::copy_from_slice(&self.frame))
    }

    /// Decode the frame. A direction that disagrees with the decoded kind is
    /// logged but not treated as an error.
    pub fn decode(&self) -> Result<Message, PosdetError> {
        let message = Message::try_from(self.raw()?)?;
        if message.direction() != self.direction {
            warn!(
                recorded = %self.direction,
                expected = %message.direction(),
                kind = %message.kind(),
                "Captured direction does not match message kind"
            );
        }
        Ok(message)
    }
}

/// An ordered sequence of captured frames, stored as JSON lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureLog {
    records: Vec<CapturedMessage>,
}

impl CaptureLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: CapturedMessage) {
        self.records.push(record);
    }

    pub fn record(&mut self, message: &Message) {
        self.push(CapturedMessage::from_message(message));
    }

    pub fn records(&self) -> &[CapturedMessage] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn write_jsonl(&self, path: impl AsRef<Path>) -> Result<(), PosdetError> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        for record in &self.records {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        info!(path = %path.display(), records = self.records.len(), "Wrote capture log");
        Ok(())
    }

    /// Read a log written by [`CaptureLog::write_jsonl`]. Blank lines are skipped.
    pub fn read_jsonl(path: impl AsRef<Path>) -> Result<Self, PosdetError> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let mut log = CaptureLog::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).map_err(|source| PosdetError::CaptureLine {
                line: index + 1,
                source,
            })?;
            log.push(record);
        }
        debug!(path = %path.display(), records = log.len(), "Read capture log");
        Ok(log)
    }

    pub fn decode_all(&self) -> Vec<Result<Message, PosdetError>> {
        self.records.iter().map(CapturedMessage::decode).collect()
    }

    pub fn summarize(&self) -> ReplaySummary {
        let mut summary = ReplaySummary::default();
        for result in self.decode_all() {
            match result {
                Ok(message) => *summary.per_kind.entry(message.kind()).or_default() += 1,
                Err(_) => summary.failures += 1,
            }
        }
        summary
    }
}

impl FromIterator<CapturedMessage> for CaptureLog {
    fn from_iter<I: IntoIterator<Item = CapturedMessage>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// Decode outcome of a whole capture log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    pub per_kind: BTreeMap<MessageKind, usize>,
    pub failures: usize,
}

impl ReplaySummary {
    pub fn decoded(&self) -> usize {
        self.per_kind.values().sum()
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        hex::decode(text).map_err(serde::de::Error::custom)
    }
}
