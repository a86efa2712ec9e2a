//! Time and position arithmetic linking video, map and records.

use crate::models::{DetectionRecord, GpsSample, LatLng};

/// Zoom used whenever the map is centred on a record or track.
pub const FOCUS_ZOOM: u8 = 15;

/// Map view before anything is loaded.
pub const DEFAULT_CENTER: LatLng = LatLng {
    lat: 21.028511,
    lng: 105.804817,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub center: LatLng,
    pub zoom: u8,
}

impl MapView {
    pub fn focus(center: LatLng) -> Self {
        Self {
            center,
            zoom: FOCUS_ZOOM,
        }
    }
}

impl Default for MapView {
    fn default() -> Self {
        Self::focus(DEFAULT_CENTER)
    }
}

/// Playback position for a detection taken from video frame `frame`.
///
/// The video is positioned `lead_secs` before the frame so the reviewer sees
/// the object approach. Non-positive frames give `None`; targets before the
/// start of the video clamp to zero.
pub fn frame_seek_target(frame: i64, frame_rate: f64, lead_secs: f64) -> Option<f64> {
    if frame <= 0 || !frame_rate.is_finite() || frame_rate <= 0.0 {
        return None;
    }
    let target = frame as f64 / frame_rate - lead_secs;
    Some(target.max(0.0))
}

/// Playback position for a detection record, if it carries a frame index.
pub fn record_seek_target(record: &DetectionRecord, frame_rate: f64, lead_secs: f64) -> Option<f64> {
    record
        .video_frame()
        .and_then(|frame| frame_seek_target(frame, frame_rate, lead_secs))
}

/// Seconds from the start of the track to `sample`.
///
/// GPS timestamps are wall-clock, so no frame rate is involved. Samples
/// stamped before the first one, unstamped samples and spans that do not
/// fit in `i64` give `None`.
pub fn gps_seek_offset(first: &GpsSample, sample: &GpsSample) -> Option<f64> {
    let millis = sample.timestamp?.checked_sub(first.timestamp?)?;
    (millis >= 0).then(|| millis as f64 / 1000.0)
}

/// View centred on the first record that has a usable position.
pub fn initial_view_for_records(records: &[DetectionRecord]) -> Option<MapView> {
    records.iter().find_map(|r| r.position()).map(MapView::focus)
}

/// View centred on the first sample of the track.
pub fn initial_view_for_track(samples: &[GpsSample]) -> Option<MapView> {
    samples.iter().find_map(|s| s.position()).map(MapView::focus)
}
