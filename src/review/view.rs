//! Plain-text presentation of review state for the terminal front end.

use crate::models::{DetectionRecord, GpsSample};
use crate::stats::ReviewStats;

use super::filter::RecordFilter;
use super::session::LoadState;

/// One list line. `selected` marks the focused record.
pub fn record_row(index: usize, record: &DetectionRecord, selected: bool) -> String {
    let marker = if selected { '>' } else { ' ' };
    let frame = record
        .video_frame()
        .map(|f| format!("frame {f}"))
        .unwrap_or_else(|| "no frame".to_string());
    format!(
        "{marker}{index:>3}  {id:<12} {category:<9} {status:<6} {process:<8} {event:<7} {captured}  {frame}",
        id = record.id,
        category = record.category,
        status = record.status,
        process = record.process_status,
        event = record.event_status,
        captured = record.date_captured.format("%Y-%m-%d %H:%M:%S"),
    )
}

/// The record list, or the placeholder for its load state.
pub fn record_list(
    state: &LoadState<Vec<DetectionRecord>>,
    filter: &RecordFilter,
    selected: Option<&str>,
) -> String {
    match state {
        LoadState::Idle => "No schedule open".to_string(),
        LoadState::Loading => "Loading records...".to_string(),
        LoadState::Failed(message) => message.clone(),
        LoadState::Ready(records) if records.is_empty() => {
            format!("No records match filter ({filter})")
        }
        LoadState::Ready(records) => {
            let mut lines = vec![format!("{} records, filter: {filter}", records.len())];
            lines.extend(
                records
                    .iter()
                    .enumerate()
                    .map(|(i, r)| record_row(i + 1, r, selected == Some(r.id.as_str()))),
            );
            lines.join("\n")
        }
    }
}

/// Detail view with the record's fields and the available key actions.
pub fn record_detail(record: &DetectionRecord) -> String {
    let position = record
        .position()
        .map(|p| p.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let mut lines = vec![
        format!("Record {} ({})", record.id, record.name),
        format!("  category     {}", record.category),
        format!("  status       {}", record.status),
        format!("  review       {}", record.process_status),
        format!("  event        {}", record.event_status),
        format!("  captured     {}", record.date_captured.format("%Y-%m-%d %H:%M:%S")),
        format!("  position     {position}"),
        format!("  confidence   {:.2}", record.confidence),
        format!("  level        {}", record.level),
    ];
    if let Some(url) = record.image_url() {
        lines.push(format!("  image        {url}"));
    }
    if let Some(object) = &record.infra_object {
        lines.push(format!("  object       {}", object.id));
    }
    if record.is_pending() {
        lines.push("  [a] accept  [s] reject  [d] go to time".to_string());
    } else {
        lines.push("  [d] go to time".to_string());
    }
    lines.join("\n")
}

pub fn stats_summary(stats: &ReviewStats) -> String {
    format!(
        "{total} records: {pending} pending, {approved} approved, {rejected} rejected ({reviewed:.0}% reviewed) | OK {ok}, NOT OK {not_ok} | NEW {new}, UPDATED {updated}",
        total = stats.total,
        pending = stats.pending,
        approved = stats.approved,
        rejected = stats.rejected,
        reviewed = stats.reviewed_pct(),
        ok = stats.ok,
        not_ok = stats.not_ok,
        new = stats.new,
        updated = stats.updated,
    )
}

pub fn gps_row(index: usize, sample: &GpsSample, offset: Option<f64>) -> String {
    let offset = offset
        .map(|o| format!("{o:>8.1}s"))
        .unwrap_or_else(|| "       -".to_string());
    let speed = sample
        .speed
        .map(|s| format!("{s:.1} m/s"))
        .unwrap_or_default();
    format!(
        "{index:>4}  {offset}  {:.6}, {:.6}  {speed}",
        sample.latitude, sample.longitude
    )
}
