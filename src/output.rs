//! Output formatting and persistence for aggregation decisions.
//!
//! Supports JSON logging and CSV append of one [`DecisionRecord`] per batch.

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::Path;
use tracing::{debug, info};

use crate::aggregators::Decision;
use crate::grade::Grade;

/// What a decision was computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Submission,
    Reviewer,
}

/// Flat, CSV-friendly view of a [`Decision`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionRecord {
    pub subject: Subject,
    pub subject_id: u64,
    pub action: &'static str,
    pub value: Option<Grade>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl DecisionRecord {
    pub fn new(subject: Subject, subject_id: u64, decision: &Decision) -> Self {
        let timestamp = match *decision {
            Decision::NoAction => None,
            Decision::Insert { timestamp, .. } | Decision::Update { timestamp, .. } => {
                Some(timestamp)
            }
        };

        Self {
            subject,
            subject_id,
            action: decision.label(),
            value: decision.value(),
            timestamp,
        }
    }
}

/// Logs a decision record as pretty-printed JSON.
pub fn print_json(record: &DecisionRecord) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(record)?);
    Ok(())
}

/// Appends a [`DecisionRecord`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &str, record: &DecisionRecord) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending decision record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(record)?;
    writer.flush()?;

    Ok(())
}
