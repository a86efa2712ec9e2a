#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use infra_review::error::ApiError;
use infra_review::models::{
    CaptureSchedule, DetectionRecord, EventStatus, GpsSample, InfraCategory, InfraImage,
    InfraStatus, ProcessStatus, ScheduleStatus,
};
use infra_review::review::{LoggedMap, LoggedVideo, MapSurface, MapView, RecordFilter, VideoSurface};
use infra_review::services::ReviewApi;
use reqwest::StatusCode;
use tokio::sync::Notify;

pub fn record(id: &str, schedule_id: &str, process: ProcessStatus) -> DetectionRecord {
    DetectionRecord {
        id: id.to_string(),
        camera_id: Some("cam-1".to_string()),
        date_captured: NaiveDate::from_ymd_opt(2024, 11, 17)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap(),
        latitude: 21.03,
        longitude: 105.85,
        category: InfraCategory::Sign,
        name: format!("sign {id}"),
        status: InfraStatus::NotOk,
        confidence: 0.9,
        level: 2,
        location: None,
        schedule_id: schedule_id.to_string(),
        bbox: None,
        event_status: EventStatus::New,
        image: None,
        process_status: process,
        infra_object: None,
    }
}

pub fn with_frame(mut record: DetectionRecord, frame: i64) -> DetectionRecord {
    record.image = Some(InfraImage {
        path_url: Some(format!("http://minio/{}.jpg", record.id)),
        frame: Some(frame),
        ..InfraImage::default()
    });
    record
}

pub fn at(mut record: DetectionRecord, lat: f64, lng: f64) -> DetectionRecord {
    record.latitude = lat;
    record.longitude = lng;
    record
}

pub fn schedule(id: &str) -> CaptureSchedule {
    let day = NaiveDate::from_ymd_opt(2024, 11, 17).unwrap();
    CaptureSchedule {
        id: id.to_string(),
        start_time: day.and_hms_opt(9, 0, 0).unwrap(),
        end_time: day.and_hms_opt(10, 0, 0).unwrap(),
        camera_id: Some("cam-1".to_string()),
        video_url: Some(format!("http://minio/{id}.mp4")),
        gps_logs_url: None,
        scheduling_status: ScheduleStatus::Done,
        frame_rate: None,
    }
}

pub fn sample(timestamp: i64, lat: f64, lng: f64) -> GpsSample {
    GpsSample {
        timestamp: Some(timestamp),
        latitude: lat,
        longitude: lng,
        accuracy: Some(5.0),
        speed: Some(8.3),
        altitude: None,
        bearing: None,
    }
}

fn rejected(status: StatusCode, message: &str) -> ApiError {
    ApiError::Rejected {
        status,
        message: message.to_string(),
    }
}

/// In-memory backend with the server's review state machine.
#[derive(Default)]
pub struct MockApi {
    records: Mutex<Vec<DetectionRecord>>,
    schedules: Mutex<HashMap<String, CaptureSchedule>>,
    tracks: Mutex<HashMap<String, Vec<GpsSample>>>,
    holds: Mutex<Vec<(RecordFilter, Arc<Notify>)>>,
    fail_lists: AtomicBool,
    pub approvals: AtomicUsize,
    pub rejections: AtomicUsize,
    pub schedule_loads: AtomicUsize,
    pub list_calls: AtomicUsize,
}

impl MockApi {
    pub fn new(records: Vec<DetectionRecord>) -> Arc<Self> {
        let api = Self::default();
        *api.records.lock().unwrap() = records;
        Arc::new(api)
    }

    pub fn add_schedule(&self, schedule: CaptureSchedule) {
        self.schedules
            .lock()
            .unwrap()
            .insert(schedule.id.clone(), schedule);
    }

    pub fn add_track(&self, url: &str, samples: Vec<GpsSample>) {
        self.tracks.lock().unwrap().insert(url.to_string(), samples);
    }

    /// Parks the next list call made with `filter` until the returned
    /// handle is notified. The held call answers with the records as they
    /// were when it was made.
    pub fn hold_next(&self, filter: RecordFilter) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.holds.lock().unwrap().push((filter, gate.clone()));
        gate
    }

    pub fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    pub fn process_status(&self, id: &str) -> Option<ProcessStatus> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.process_status)
    }

    fn decide(&self, record_id: &str, to: ProcessStatus) -> Result<(), ApiError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or_else(|| rejected(StatusCode::NOT_FOUND, "infra object process not found"))?;
        if record.process_status != ProcessStatus::Pending {
            return Err(rejected(
                StatusCode::BAD_REQUEST,
                "infra object process is not pending",
            ));
        }
        record.process_status = to;
        Ok(())
    }
}

#[async_trait]
impl ReviewApi for MockApi {
    async fn list_records(
        &self,
        schedule_id: &str,
        filter: &RecordFilter,
    ) -> Result<Vec<DetectionRecord>, ApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        // The response reflects the store at request time, even when held.
        let response = if self.fail_lists.load(Ordering::SeqCst) {
            Err(rejected(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable"))
        } else {
            let records = self.records.lock().unwrap();
            Ok(records
                .iter()
                .filter(|r| r.schedule_id == schedule_id && filter.matches(r))
                .cloned()
                .collect())
        };

        let gate = {
            let mut holds = self.holds.lock().unwrap();
            holds
                .iter()
                .position(|(f, _)| f == filter)
                .map(|i| holds.remove(i).1)
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }

        response
    }

    async fn approve(&self, record_id: &str) -> Result<(), ApiError> {
        self.decide(record_id, ProcessStatus::Approved)?;
        self.approvals.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn reject(&self, record_id: &str) -> Result<(), ApiError> {
        self.decide(record_id, ProcessStatus::Rejected)?;
        self.rejections.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn process_remaining(&self, schedule_id: &str) -> Result<(), ApiError> {
        let mut records = self.records.lock().unwrap();
        for r in records
            .iter_mut()
            .filter(|r| r.schedule_id == schedule_id && r.process_status == ProcessStatus::Pending)
        {
            r.process_status = ProcessStatus::Approved;
        }
        Ok(())
    }

    async fn get_schedule(&self, schedule_id: &str) -> Result<CaptureSchedule, ApiError> {
        self.schedule_loads.fetch_add(1, Ordering::SeqCst);
        self.schedules
            .lock()
            .unwrap()
            .get(schedule_id)
            .cloned()
            .ok_or_else(|| rejected(StatusCode::NOT_FOUND, "scheduling not found"))
    }

    async fn fetch_gps_track(&self, url: &str) -> Vec<GpsSample> {
        self.tracks
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_default()
    }
}

/// Video surface whose state stays observable after it is handed over.
#[derive(Clone, Default)]
pub struct SharedVideo(pub Arc<Mutex<LoggedVideo>>);

impl SharedVideo {
    pub fn seeks(&self) -> Vec<f64> {
        self.0.lock().unwrap().seeks.clone()
    }

    pub fn url(&self) -> Option<String> {
        self.0.lock().unwrap().url.clone()
    }
}

impl VideoSurface for SharedVideo {
    fn load(&mut self, url: Option<&str>) {
        self.0.lock().unwrap().load(url)
    }

    fn seek(&mut self, secs: f64) {
        self.0.lock().unwrap().seek(secs)
    }

    fn play(&mut self) {
        self.0.lock().unwrap().play()
    }

    fn position(&self) -> f64 {
        self.0.lock().unwrap().position()
    }

    fn is_playing(&self) -> bool {
        self.0.lock().unwrap().is_playing()
    }
}

/// Map surface whose state stays observable after it is handed over.
#[derive(Clone, Default)]
pub struct SharedMap(pub Arc<Mutex<LoggedMap>>);

impl SharedMap {
    pub fn moves(&self) -> usize {
        self.0.lock().unwrap().moves
    }
}

impl MapSurface for SharedMap {
    fn set_view(&mut self, view: MapView) {
        self.0.lock().unwrap().set_view(view)
    }

    fn view(&self) -> MapView {
        self.0.lock().unwrap().view()
    }
}
