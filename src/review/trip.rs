//! Trip review: a schedule's video played against its GPS track.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::models::{CaptureSchedule, GpsSample};
use crate::services::ReviewApi;

use super::session::LoadState;
use super::surface::{MapSurface, VideoSurface};
use super::sync::{MapView, gps_seek_offset, initial_view_for_track};

pub struct TripReview {
    api: Arc<dyn ReviewApi>,
    schedule: LoadState<CaptureSchedule>,
    samples: Vec<GpsSample>,
    video: Box<dyn VideoSurface>,
    map: Box<dyn MapSurface>,
}

impl TripReview {
    pub fn new(api: Arc<dyn ReviewApi>, video: Box<dyn VideoSurface>, mut map: Box<dyn MapSurface>) -> Self {
        map.set_view(MapView::default());
        Self {
            api,
            schedule: LoadState::Idle,
            samples: Vec::new(),
            video,
            map,
        }
    }

    /// Fetches `schedule_id` and shows it.
    #[tracing::instrument(skip(self))]
    pub async fn open(&mut self, schedule_id: &str) {
        self.schedule = LoadState::Loading;
        self.samples.clear();

        match self.api.get_schedule(schedule_id).await {
            Ok(schedule) => self.show(schedule).await,
            Err(e) => {
                warn!(schedule_id, error = %e, "Schedule load failed");
                self.schedule = LoadState::Failed(if e.is_not_found() {
                    "Schedule not found".to_string()
                } else {
                    format!("Error loading schedule: {}", e.user_message())
                });
            }
        }
    }

    /// Loads the video and GPS track of an already fetched schedule. A
    /// missing or unreadable GPS log leaves the track empty.
    pub async fn show(&mut self, schedule: CaptureSchedule) {
        self.video.load(schedule.video_url());

        let samples = match schedule.gps_log_url() {
            Some(url) => self.api.fetch_gps_track(url).await,
            None => {
                debug!(schedule_id = %schedule.id, "Schedule has no GPS log");
                Vec::new()
            }
        };

        if let Some(view) = initial_view_for_track(&samples) {
            self.map.set_view(view);
        }
        info!(schedule_id = %schedule.id, samples = samples.len(), "Trip loaded");

        self.samples = samples;
        self.schedule = LoadState::Ready(schedule);
    }

    /// Seeks the video to the time of sample `index`. Returns the offset
    /// sought to.
    pub fn go_to_sample(&mut self, index: usize) -> Option<f64> {
        let first = self.samples.first()?;
        let sample = self.samples.get(index)?;
        let offset = gps_seek_offset(first, sample)?;

        debug!(index, offset, "Seeking to GPS sample");
        self.video.seek(offset);
        self.video.play();
        Some(offset)
    }

    /// Each sample with the video offset it maps to.
    pub fn samples_with_offsets(&self) -> Vec<(&GpsSample, Option<f64>)> {
        let Some(first) = self.samples.first() else {
            return Vec::new();
        };
        self.samples
            .iter()
            .map(|s| (s, gps_seek_offset(first, s)))
            .collect()
    }

    pub fn schedule(&self) -> &LoadState<CaptureSchedule> {
        &self.schedule
    }

    pub fn samples(&self) -> &[GpsSample] {
        &self.samples
    }

    pub fn video_position(&self) -> f64 {
        self.video.position()
    }

    pub fn map_view(&self) -> MapView {
        self.map.view()
    }
}
