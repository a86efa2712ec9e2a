//! Record filter for the review list.
//!
//! Each dimension is optional; unset imposes no constraint and set
//! dimensions combine with AND. The same filter drives the backend query and
//! local matching.

use std::fmt;

use crate::models::{DetectionRecord, EventStatus, InfraStatus, ProcessStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RecordFilter {
    pub status: Option<InfraStatus>,
    pub process_status: Option<ProcessStatus>,
    pub event_status: Option<EventStatus>,
}

impl RecordFilter {
    /// No constraints.
    pub fn all() -> Self {
        Self::default()
    }

    /// Only records still awaiting a decision.
    pub fn pending() -> Self {
        Self {
            process_status: Some(ProcessStatus::Pending),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.process_status.is_none() && self.event_status.is_none()
    }

    pub fn matches(&self, record: &DetectionRecord) -> bool {
        self.status.is_none_or(|s| record.status == s)
            && self.process_status.is_none_or(|s| record.process_status == s)
            && self.event_status.is_none_or(|s| record.event_status == s)
    }

    /// Query parameters for the set dimensions only.
    pub fn query_pairs(&self) -> Vec<(&'static str, &'static str)> {
        let mut pairs = Vec::new();
        if let Some(s) = self.status {
            pairs.push(("status", s.as_str()));
        }
        if let Some(s) = self.process_status {
            pairs.push(("processStatus", s.as_str()));
        }
        if let Some(s) = self.event_status {
            pairs.push(("eventStatus", s.as_str()));
        }
        pairs
    }

    /// Applies a `field=value` assignment. `*` or an empty value clears the
    /// field. Field names accept the wire spelling or snake case.
    pub fn assign(&mut self, assignment: &str) -> Result<(), String> {
        let (field, value) = assignment
            .split_once('=')
            .ok_or_else(|| format!("expected field=value, got '{assignment}'"))?;
        let value = value.trim();
        let clear = value.is_empty() || value == "*";

        match field.trim().to_ascii_lowercase().as_str() {
            "status" => self.status = if clear { None } else { Some(value.parse()?) },
            "processstatus" | "process_status" => {
                self.process_status = if clear { None } else { Some(value.parse()?) }
            }
            "eventstatus" | "event_status" => {
                self.event_status = if clear { None } else { Some(value.parse()?) }
            }
            other => return Err(format!("unknown filter field '{other}'")),
        }
        Ok(())
    }
}

impl fmt::Display for RecordFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("all");
        }
        let parts: Vec<String> = self
            .query_pairs()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        f.write_str(&parts.join(" "))
    }
}
