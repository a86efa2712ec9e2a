//! Decoding of backend payloads and raw GPS logs.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::models::{ApiEnvelope, GpsSample};

/// Parses a GPS log body into the ordered list of usable samples.
///
/// Never fails: a body that is not a JSON array yields an empty track, and
/// entries without numeric coordinates are dropped. A missing or non-numeric
/// timestamp leaves the sample in place without a stamp. Order of the
/// surviving entries is preserved.
pub fn parse_gps_log(bytes: &[u8]) -> Vec<GpsSample> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Array(entries)) => validate_gps_entries(entries),
        Ok(other) => {
            warn!(kind = json_kind(&other), "GPS log is not a JSON array, ignoring");
            Vec::new()
        }
        Err(e) => {
            warn!(error = %e, "GPS log is not valid JSON, ignoring");
            Vec::new()
        }
    }
}

/// Keeps the entries that can be placed on the map.
pub fn validate_gps_entries(entries: Vec<Value>) -> Vec<GpsSample> {
    let total = entries.len();
    let samples: Vec<GpsSample> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let sample = gps_sample_from_value(&entry);
            if sample.is_none() {
                debug!(index, "Dropping malformed GPS entry");
            }
            sample
        })
        .collect();

    let dropped = total - samples.len();
    if dropped > 0 {
        warn!(total, dropped, "Discarded malformed GPS entries");
    }
    samples
}

fn gps_sample_from_value(entry: &Value) -> Option<GpsSample> {
    let obj = entry.as_object()?;

    let latitude = finite(obj.get("latitude")?)?;
    let longitude = finite(obj.get("longitude")?)?;
    let timestamp = obj.get("timestamp").and_then(epoch_millis);

    let optional = |key: &str| obj.get(key).and_then(finite);

    Some(GpsSample {
        timestamp,
        latitude,
        longitude,
        accuracy: optional("accuracy"),
        speed: optional("speed"),
        altitude: optional("altitude"),
        bearing: optional("bearing"),
    })
}

fn finite(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

fn epoch_millis(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| finite(value).map(|v| v.trunc() as i64))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Decodes an enveloped backend response.
///
/// Non-2xx statuses become [`ApiError::Rejected`] carrying the envelope
/// `message` when the body has one, else the body text, else the status text.
pub fn decode_envelope<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T, ApiError> {
    if !status.is_success() {
        return Err(ApiError::Rejected {
            status,
            message: rejection_message(status, body),
        });
    }

    let envelope: ApiEnvelope<T> = serde_json::from_slice(body)?;
    envelope.data.ok_or_else(|| {
        ApiError::MissingData(envelope.message.unwrap_or_else(|| "no message".to_string()))
    })
}

/// Like [`decode_envelope`] for calls whose body carries nothing we use.
pub fn check_envelope(status: StatusCode, body: &[u8]) -> Result<(), ApiError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(ApiError::Rejected {
            status,
            message: rejection_message(status, body),
        })
    }
}

fn rejection_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(envelope) = serde_json::from_slice::<ApiEnvelope<Value>>(body) {
        if let Some(message) = envelope.message.filter(|m| !m.trim().is_empty()) {
            return message;
        }
    }

    let text = String::from_utf8_lossy(body).trim().to_string();
    if !text.is_empty() {
        return text;
    }

    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}
