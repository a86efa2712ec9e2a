//! Trait for the backend the review session talks to.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::{CaptureSchedule, DetectionRecord, GpsSample};
use crate::review::filter::RecordFilter;

/// Abstraction over the review backend (e.g. the REST service).
///
/// Mutations return only success or failure. The record set is always
/// re-read afterwards; callers never patch local copies from a mutation.
#[async_trait]
pub trait ReviewApi: Send + Sync {
    /// Records of `schedule_id` matching `filter`, in backend order.
    async fn list_records(
        &self,
        schedule_id: &str,
        filter: &RecordFilter,
    ) -> Result<Vec<DetectionRecord>, ApiError>;

    /// Moves a PENDING record to APPROVED.
    async fn approve(&self, record_id: &str) -> Result<(), ApiError>;

    /// Moves a PENDING record to REJECTED.
    async fn reject(&self, record_id: &str) -> Result<(), ApiError>;

    /// Approves every record of the schedule that is still PENDING.
    async fn process_remaining(&self, schedule_id: &str) -> Result<(), ApiError>;

    async fn get_schedule(&self, schedule_id: &str) -> Result<CaptureSchedule, ApiError>;

    /// Raw fetch of a GPS log. Failures yield an empty track.
    async fn fetch_gps_track(&self, url: &str) -> Vec<GpsSample>;
}
