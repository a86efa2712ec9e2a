use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{DetectionRecord, EventStatus, InfraStatus, ProcessStatus};

/// Review progress over a set of detection records.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ReviewStats {
    pub computed_at: DateTime<Utc>,
    pub schedule_id: Option<String>,
    pub total: usize,

    // review state
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,

    // detector status
    pub ok: usize,
    pub not_ok: usize,

    // event classification
    pub new: usize,
    pub updated: usize,
}

impl ReviewStats {
    pub fn from_records(records: &[DetectionRecord]) -> Self {
        let mut s = ReviewStats {
            computed_at: Utc::now(),
            total: records.len(),
            ..Default::default()
        };

        for r in records {
            match r.process_status {
                ProcessStatus::Pending => s.pending += 1,
                ProcessStatus::Approved => s.approved += 1,
                ProcessStatus::Rejected => s.rejected += 1,
            }

            match r.status {
                InfraStatus::Ok => s.ok += 1,
                InfraStatus::NotOk => s.not_ok += 1,
            }

            match r.event_status {
                EventStatus::New => s.new += 1,
                EventStatus::Updated => s.updated += 1,
                EventStatus::Repair | EventStatus::Lost => {}
            }
        }

        s
    }

    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    /// Share of records that already have a decision.
    pub fn reviewed_pct(&self) -> f64 {
        Self::pct(self.approved + self.rejected, self.total)
    }

    pub fn with_schedule(mut self, schedule_id: &str) -> Self {
        self.schedule_id = Some(schedule_id.to_string());
        self
    }
}
