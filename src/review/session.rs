//! The review session: one schedule's detection records shown on a list, a
//! map and a video, kept consistent with each other and with the backend.
//!
//! The backend owns review state. The session only mirrors it: every
//! mutation is followed by a re-read, and a failed mutation leaves the local
//! sets exactly as they were.
//!
//! Calls may overlap (accept on one record while a filter reload is still in
//! flight). Each load carries a ticket naming the generation it was started
//! for; when it completes, its result is applied only if no newer schedule
//! or filter has been chosen in the meantime.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::config::ReviewConfig;
use crate::error::ApiError;
use crate::models::{CaptureSchedule, DetectionRecord};
use crate::services::ReviewApi;
use crate::stats::ReviewStats;

use super::filter::RecordFilter;
use super::notice::Notice;
use super::shortcuts::{ReviewAction, ShortcutRegistry, Subscription};
use super::surface::{MapSurface, VideoSurface};
use super::sync::{MapView, initial_view_for_records, record_seek_target};

/// State of a view backed by a remote load.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            LoadState::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LoadState::Failed(_))
    }
}

/// Detail view of the selected record. Shortcut keys stay bound to the
/// record for as long as this value lives.
#[derive(Debug)]
pub struct RecordDetail {
    record: DetectionRecord,
    _shortcuts: Subscription,
}

impl RecordDetail {
    pub fn record(&self) -> &DetectionRecord {
        &self.record
    }
}

/// What selecting a record did to the other views.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub record_id: String,
    /// Video position sought to, if the record has a frame index.
    pub seek_to: Option<f64>,
    pub map_moved: bool,
}

#[derive(Debug, Clone)]
struct LoadTicket {
    generation: u64,
    schedule_id: String,
    filter: RecordFilter,
}

struct SessionState {
    schedule_id: Option<String>,
    schedule: LoadState<CaptureSchedule>,
    filter: RecordFilter,
    generation: u64,
    records: LoadState<Vec<DetectionRecord>>,
    stats: ReviewStats,
    selected: Option<String>,
    detail: Option<RecordDetail>,
    notices: Vec<Notice>,
    frame_rate: f64,
    video: Box<dyn VideoSurface>,
    map: Box<dyn MapSurface>,
}

impl SessionState {
    fn record(&self, record_id: &str) -> Option<&DetectionRecord> {
        self.records
            .ready()
            .and_then(|records| records.iter().find(|r| r.id == record_id))
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.detail = None;
    }
}

pub struct ReviewSession {
    api: Arc<dyn ReviewApi>,
    config: ReviewConfig,
    shortcuts: ShortcutRegistry,
    state: Mutex<SessionState>,
}

impl ReviewSession {
    pub fn new(
        api: Arc<dyn ReviewApi>,
        video: Box<dyn VideoSurface>,
        mut map: Box<dyn MapSurface>,
        config: ReviewConfig,
    ) -> Self {
        map.set_view(MapView::default());
        let state = SessionState {
            schedule_id: None,
            schedule: LoadState::Idle,
            filter: RecordFilter::pending(),
            generation: 0,
            records: LoadState::Idle,
            stats: ReviewStats::default(),
            selected: None,
            detail: None,
            notices: Vec::new(),
            frame_rate: config.frame_rate,
            video,
            map,
        };
        Self {
            api,
            config,
            shortcuts: ShortcutRegistry::new(),
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens `schedule_id`: loads the schedule and both record sets
    /// concurrently. A failing schedule load leaves the record views usable.
    #[tracing::instrument(skip(self))]
    pub async fn open(&self, schedule_id: &str) {
        {
            let mut state = self.lock();
            state.schedule_id = Some(schedule_id.to_string());
            state.schedule = LoadState::Loading;
            state.records = LoadState::Loading;
            state.stats = ReviewStats::default();
            state.frame_rate = self.config.frame_rate;
            state.generation += 1;
            state.clear_selection();
        }

        tokio::join!(self.load_schedule(schedule_id), self.refresh());
    }

    async fn load_schedule(&self, schedule_id: &str) {
        let result = self.api.get_schedule(schedule_id).await;

        let mut state = self.lock();
        if state.schedule_id.as_deref() != Some(schedule_id) {
            debug!(schedule_id, "Discarding schedule for a session that moved on");
            return;
        }

        match result {
            Ok(schedule) => {
                state.frame_rate = schedule.frame_rate_or(self.config.frame_rate);
                state.video.load(schedule.video_url());
                info!(
                    schedule_id,
                    status = %schedule.scheduling_status,
                    frame_rate = state.frame_rate,
                    "Schedule loaded"
                );
                state.schedule = LoadState::Ready(schedule);
            }
            Err(e) => {
                warn!(schedule_id, error = %e, "Schedule load failed");
                state.schedule = LoadState::Failed(load_failure_text("Schedule", &e));
            }
        }
    }

    /// Switches to `schedule_id` with `filter` and loads the matching records.
    ///
    /// Returns the set shown once the load completes: empty if it failed, or
    /// the newer set if a later call superseded this one.
    pub async fn load_records(&self, schedule_id: &str, filter: RecordFilter) -> Vec<DetectionRecord> {
        let switching = {
            let mut state = self.lock();
            state.filter = filter;
            let switching = state.schedule_id.as_deref() != Some(schedule_id);
            if !switching {
                state.generation += 1;
                state.records = LoadState::Loading;
                state.clear_selection();
            }
            switching
        };

        if switching {
            self.open(schedule_id).await;
        } else {
            self.refresh().await;
        }
        self.records()
    }

    /// Replaces the filter for the open schedule and reloads.
    pub async fn set_filter(&self, filter: RecordFilter) -> Vec<DetectionRecord> {
        let schedule_id = self.lock().schedule_id.clone();
        match schedule_id {
            Some(id) => self.load_records(&id, filter).await,
            None => {
                self.lock().filter = filter;
                Vec::new()
            }
        }
    }

    fn ticket(&self) -> Option<LoadTicket> {
        let state = self.lock();
        state.schedule_id.clone().map(|schedule_id| LoadTicket {
            generation: state.generation,
            schedule_id,
            filter: state.filter,
        })
    }

    /// Re-reads the filtered set and the unfiltered set (for statistics).
    /// Returns `true` if the filtered set was applied.
    pub async fn refresh(&self) -> bool {
        let Some(ticket) = self.ticket() else {
            return false;
        };

        let unfiltered = RecordFilter::all();
        let (filtered, all) = tokio::join!(
            self.api.list_records(&ticket.schedule_id, &ticket.filter),
            self.api.list_records(&ticket.schedule_id, &unfiltered),
        );

        let mut state = self.lock();
        if ticket.generation == state.generation {
            match all {
                Ok(all) => {
                    state.stats = ReviewStats::from_records(&all).with_schedule(&ticket.schedule_id);
                }
                Err(e) => warn!(schedule_id = %ticket.schedule_id, error = %e, "Statistics load failed"),
            }
        }

        self.apply_records(&mut state, &ticket, filtered)
    }

    fn apply_records(
        &self,
        state: &mut SessionState,
        ticket: &LoadTicket,
        result: Result<Vec<DetectionRecord>, ApiError>,
    ) -> bool {
        if ticket.generation != state.generation {
            debug!(
                ticket = ticket.generation,
                current = state.generation,
                filter = %ticket.filter,
                "Discarding stale record load"
            );
            return false;
        }

        match result {
            Ok(records) => {
                info!(
                    schedule_id = %ticket.schedule_id,
                    filter = %ticket.filter,
                    count = records.len(),
                    "Records loaded"
                );

                let selection_survives = state
                    .selected
                    .as_ref()
                    .is_some_and(|id| records.iter().any(|r| &r.id == id));
                if !selection_survives {
                    state.clear_selection();
                }

                if state.selected.is_none() {
                    if let Some(view) = initial_view_for_records(&records) {
                        state.map.set_view(view);
                    }
                }

                state.records = LoadState::Ready(records);
                true
            }
            Err(e) => {
                warn!(schedule_id = %ticket.schedule_id, error = %e, "Record load failed");
                if state.records.ready().is_some() {
                    state
                        .notices
                        .push(Notice::error("Refresh Failed", e.user_message()));
                } else {
                    state.records = LoadState::Failed(load_failure_text("Records", &e));
                }
                false
            }
        }
    }

    /// Focuses `record_id`: seeks the video, pans the map when needed and
    /// opens the detail view with its shortcuts. `None` if the record is not
    /// in the current list.
    pub fn select_record(&self, record_id: &str) -> Option<Selection> {
        let mut state = self.lock();
        let record = state.record(record_id)?.clone();

        let seek_to = record_seek_target(&record, state.frame_rate, self.config.seek_lead_secs);
        if let Some(secs) = seek_to {
            state.video.seek(secs);
            state.video.play();
        }

        let mut map_moved = false;
        if let Some(position) = record.position() {
            if state.map.view().center != position {
                state.map.set_view(MapView::focus(position));
                map_moved = true;
            }
        }

        debug!(record_id, ?seek_to, map_moved, "Record selected");
        state.selected = Some(record.id.clone());
        let shortcuts = self.shortcuts.bind(&record.id);
        state.detail = Some(RecordDetail {
            record,
            _shortcuts: shortcuts,
        });

        Some(Selection {
            record_id: record_id.to_string(),
            seek_to,
            map_moved,
        })
    }

    /// Seeks the video back to `record_id`'s position without touching the
    /// selection.
    pub fn go_to_time(&self, record_id: &str) -> Option<f64> {
        let mut state = self.lock();
        let record = state.record(record_id)?;
        let secs = record_seek_target(record, state.frame_rate, self.config.seek_lead_secs)?;
        state.video.seek(secs);
        state.video.play();
        Some(secs)
    }

    /// Selects the record after the current one, or the first.
    pub fn select_next(&self) -> Option<Selection> {
        self.select_relative(1)
    }

    /// Selects the record before the current one, or the first.
    pub fn select_previous(&self) -> Option<Selection> {
        self.select_relative(-1)
    }

    fn select_relative(&self, step: isize) -> Option<Selection> {
        let target = {
            let state = self.lock();
            let records = state.records.ready()?;
            if records.is_empty() {
                return None;
            }
            let current = state
                .selected
                .as_ref()
                .and_then(|id| records.iter().position(|r| &r.id == id));
            let index = match current {
                Some(i) => i.saturating_add_signed(step).min(records.len() - 1),
                None => 0,
            };
            records[index].id.clone()
        };
        self.select_record(&target)
    }

    /// Unmounts the detail view, which also unbinds its shortcuts.
    pub fn close_detail(&self) {
        let mut state = self.lock();
        if let Some(detail) = state.detail.take() {
            debug!(record_id = %detail.record.id, "Detail closed");
        }
    }

    /// Routes a key press to the bound record, if any.
    pub async fn handle_key(&self, key: char) -> Option<ReviewAction> {
        let action = self.shortcuts.dispatch(key)?;
        match &action {
            ReviewAction::Accept(id) => {
                self.accept(id).await;
            }
            ReviewAction::Reject(id) => {
                self.reject(id).await;
            }
            ReviewAction::GoToTime(id) => {
                self.go_to_time(id);
            }
        }
        Some(action)
    }

    /// Approves a record. On success the detail view closes and the sets are
    /// re-read; on failure nothing local changes and an error notice is
    /// queued.
    #[tracing::instrument(skip(self))]
    pub async fn accept(&self, record_id: &str) -> bool {
        match self.api.approve(record_id).await {
            Ok(()) => {
                info!(record_id, "Record approved");
                self.after_decision(record_id, Notice::success("Process Accepted", "Infra object has been accepted."));
                self.refresh().await;
                true
            }
            Err(e) => {
                warn!(record_id, error = %e, "Approve failed");
                self.notify(Notice::error("Process Failed", e.user_message()));
                false
            }
        }
    }

    /// Rejects a record. Same contract as [`accept`](Self::accept).
    #[tracing::instrument(skip(self))]
    pub async fn reject(&self, record_id: &str) -> bool {
        match self.api.reject(record_id).await {
            Ok(()) => {
                info!(record_id, "Record rejected");
                self.after_decision(record_id, Notice::success("Process Rejected", "Infra object has been rejected."));
                self.refresh().await;
                true
            }
            Err(e) => {
                warn!(record_id, error = %e, "Reject failed");
                self.notify(Notice::error("Reject Failed", e.user_message()));
                false
            }
        }
    }

    /// Approves every record of `schedule_id` still pending.
    #[tracing::instrument(skip(self))]
    pub async fn process_all(&self, schedule_id: &str) -> bool {
        match self.api.process_remaining(schedule_id).await {
            Ok(()) => {
                info!(schedule_id, "Remaining records processed");
                self.notify(Notice::success(
                    "Process Schedule",
                    "All infrastructure objects have been processed.",
                ));
                let is_open = self.lock().schedule_id.as_deref() == Some(schedule_id);
                if is_open {
                    self.refresh().await;
                }
                true
            }
            Err(e) => {
                warn!(schedule_id, error = %e, "Process all failed");
                self.notify(Notice::error("Process Schedule Failed", e.user_message()));
                false
            }
        }
    }

    fn after_decision(&self, record_id: &str, notice: Notice) {
        let mut state = self.lock();
        if state.detail.as_ref().is_some_and(|d| d.record.id == record_id) {
            state.detail = None;
        }
        state.notices.push(notice);
    }

    fn notify(&self, notice: Notice) {
        self.lock().notices.push(notice);
    }

    /// Current filtered list, empty unless loaded.
    pub fn records(&self) -> Vec<DetectionRecord> {
        self.lock().records.ready().cloned().unwrap_or_default()
    }

    pub fn record_state(&self) -> LoadState<Vec<DetectionRecord>> {
        self.lock().records.clone()
    }

    pub fn schedule_state(&self) -> LoadState<CaptureSchedule> {
        self.lock().schedule.clone()
    }

    pub fn schedule_id(&self) -> Option<String> {
        self.lock().schedule_id.clone()
    }

    pub fn stats(&self) -> ReviewStats {
        self.lock().stats.clone()
    }

    pub fn filter(&self) -> RecordFilter {
        self.lock().filter
    }

    pub fn frame_rate(&self) -> f64 {
        self.lock().frame_rate
    }

    pub fn selected(&self) -> Option<DetectionRecord> {
        let state = self.lock();
        let id = state.selected.as_deref()?;
        state.record(id).cloned()
    }

    /// Record shown in the detail view, if it is mounted.
    pub fn detail(&self) -> Option<DetectionRecord> {
        self.lock().detail.as_ref().map(|d| d.record().clone())
    }

    pub fn shortcuts_bound(&self) -> bool {
        self.shortcuts.is_bound()
    }

    /// Drains queued notices, oldest first.
    pub fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut self.lock().notices)
    }

    pub fn video_position(&self) -> f64 {
        self.lock().video.position()
    }

    pub fn video_playing(&self) -> bool {
        self.lock().video.is_playing()
    }

    pub fn map_view(&self) -> MapView {
        self.lock().map.view()
    }
}

fn load_failure_text(what: &str, err: &ApiError) -> String {
    if err.is_not_found() {
        format!("{what} not found")
    } else {
        format!("Error loading {}: {}", what.to_lowercase(), err.user_message())
    }
}
