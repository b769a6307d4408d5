//! Completion records: logged intervals of work on a task
//!
//! Records are kept in memory only. Editing goes through [`CompletionEdit`],
//! which works in calendar days and whole minutes the way a person fills in
//! the form, and converts back to a Unix time and seconds on save.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// A historical logged interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    /// Unix time, seconds
    pub time: i64,
    /// Seconds
    pub duration: u64,
}

impl CompletionRecord {
    pub fn new(time: i64, duration: u64) -> Self {
        Self { time, duration }
    }

    /// Calendar day (UTC) the record falls on
    pub fn date(&self) -> NaiveDate {
        DateTime::<Utc>::from_timestamp(self.time, 0)
            .unwrap_or(DateTime::UNIX_EPOCH)
            .date_naive()
    }

    /// Duration rounded up to whole minutes, or `None` for an empty record
    pub fn duration_minutes(&self) -> Option<u64> {
        (self.duration > 0).then(|| self.duration.div_ceil(60))
    }
}

/// Form-level view of a record being edited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEdit {
    pub date: NaiveDate,
    pub duration_minutes: Option<u64>,
}

impl CompletionEdit {
    pub fn from_record(record: &CompletionRecord) -> Self {
        Self {
            date: record.date(),
            duration_minutes: record.duration_minutes(),
        }
    }

    /// Parse a `YYYY-MM-DD` date as entered in a date field
    pub fn parse(date: &str, duration_minutes: Option<u64>) -> Result<Self> {
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|e| AppError::InvalidInput(format!("date {}: {}", date, e)))?;
        Ok(Self { date, duration_minutes })
    }

    fn duration(&self) -> u64 {
        self.duration_minutes.unwrap_or(0).saturating_mul(60)
    }

    /// A new record at midnight UTC of the chosen day
    pub fn to_record(&self) -> CompletionRecord {
        CompletionRecord {
            time: self.date.and_time(NaiveTime::MIN).and_utc().timestamp(),
            duration: self.duration(),
        }
    }

    /// Save over `record`. Its exact time is kept unless the day changed,
    /// in which case the record moves to midnight UTC of the new day.
    pub fn apply_to(&self, record: &CompletionRecord) -> CompletionRecord {
        if self.date == record.date() {
            CompletionRecord {
                time: record.time,
                duration: self.duration(),
            }
        } else {
            self.to_record()
        }
    }
}

/// In-memory store of completion records keyed by id
#[derive(Debug, Default)]
pub struct CompletionLog {
    records: BTreeMap<u64, CompletionRecord>,
    next_id: u64,
}

impl CompletionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records in insertion order
    pub fn list(&self) -> Vec<(u64, CompletionRecord)> {
        self.records.iter().map(|(id, r)| (*id, *r)).collect()
    }

    pub fn get(&self, id: u64) -> Result<CompletionRecord> {
        self.records
            .get(&id)
            .copied()
            .ok_or(AppError::CompletionNotFound(id))
    }

    pub fn insert(&mut self, record: CompletionRecord) -> u64 {
        self.next_id += 1;
        self.records.insert(self.next_id, record);
        self.next_id
    }

    pub fn update(&mut self, id: u64, record: CompletionRecord) -> Result<CompletionRecord> {
        let slot = self
            .records
            .get_mut(&id)
            .ok_or(AppError::CompletionNotFound(id))?;
        *slot = record;
        Ok(record)
    }

    pub fn remove(&mut self, id: u64) -> Result<CompletionRecord> {
        self.records
            .remove(&id)
            .ok_or(AppError::CompletionNotFound(id))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
