//! Data model shared with the review backend.
//!
//! Field names follow the backend's camelCase JSON. Enum wire values are the
//! exact strings the backend emits (note `"NOT OK"` with a space).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares a string-valued enum with its wire spelling, `Display` and a
/// lenient `FromStr` (wire value or variant name, case-insensitive,
/// `_` and space interchangeable).
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().replace('_', " ").to_ascii_uppercase();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().replace('_', " ") == wanted)
                    .ok_or_else(|| format!("unknown {} '{}'", stringify!($name), s))
            }
        }
    };
}

wire_enum!(
    /// Kind of roadside object.
    InfraCategory {
        Sign => "SIGN",
        Road => "ROAD",
        Lamp => "LAMP",
        Guardrail => "GUARDRAIL",
    }
);

wire_enum!(
    /// Condition reported by the detector.
    InfraStatus {
        Ok => "OK",
        NotOk => "NOT OK",
    }
);

wire_enum!(
    /// Human adjudication state of a detection.
    ProcessStatus {
        Pending => "PENDING",
        Approved => "APPROVED",
        Rejected => "REJECTED",
    }
);

wire_enum!(
    /// Whether a detection is a new object or a change to a known one.
    ///
    /// `Repair` and `Lost` only occur on the wider event model but are
    /// accepted so those payloads still decode.
    EventStatus {
        New => "NEW",
        Updated => "UPDATED",
        Repair => "REPAIR",
        Lost => "LOST",
    }
);

wire_enum!(
    ScheduleStatus {
        Pending => "PENDING",
        Running => "RUNNING",
        Done => "DONE",
        Failed => "FAILED",
    }
);

/// A geographic point. Only constructed from finite coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        (lat.is_finite() && lng.is_finite()).then_some(Self { lat, lng })
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InfraImage {
    pub id: Option<String>,
    pub file_name: Option<String>,
    pub path_url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Index of the video frame the detection was taken from.
    pub frame: Option<i64>,
}

/// The known infrastructure object a detection refers to, when one exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfraObjectRef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<InfraCategory>,
    #[serde(default)]
    pub status: Option<InfraStatus>,
}

/// One machine-detected occurrence of a roadside object awaiting or having
/// received human review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionRecord {
    pub id: String,
    #[serde(default)]
    pub camera_id: Option<String>,
    pub date_captured: NaiveDateTime,
    pub latitude: f64,
    pub longitude: f64,
    pub category: InfraCategory,
    #[serde(default)]
    pub name: String,
    pub status: InfraStatus,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub level: i32,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub schedule_id: String,
    #[serde(default)]
    pub bbox: Option<String>,
    pub event_status: EventStatus,
    #[serde(default)]
    pub image: Option<InfraImage>,
    pub process_status: ProcessStatus,
    #[serde(default)]
    pub infra_object: Option<InfraObjectRef>,
}

impl DetectionRecord {
    /// Marker position, `None` if either coordinate is not finite.
    pub fn position(&self) -> Option<LatLng> {
        LatLng::new(self.latitude, self.longitude)
    }

    /// Source video frame, only when positive.
    pub fn video_frame(&self) -> Option<i64> {
        self.image
            .as_ref()
            .and_then(|img| img.frame)
            .filter(|f| *f > 0)
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image
            .as_ref()
            .and_then(|img| img.path_url.as_deref())
            .filter(|u| !u.is_empty())
    }

    pub fn is_pending(&self) -> bool {
        self.process_status == ProcessStatus::Pending
    }
}

/// A recording window for one camera: video plus optional GPS log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureSchedule {
    pub id: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    #[serde(default)]
    pub camera_id: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub gps_logs_url: Option<String>,
    pub scheduling_status: ScheduleStatus,
    /// Playback rate of the recorded video, when the backend knows it.
    #[serde(default)]
    pub frame_rate: Option<f64>,
}

impl CaptureSchedule {
    pub fn video_url(&self) -> Option<&str> {
        self.video_url.as_deref().filter(|u| !u.trim().is_empty())
    }

    pub fn gps_log_url(&self) -> Option<&str> {
        self.gps_logs_url.as_deref().filter(|u| !u.trim().is_empty())
    }

    /// The schedule's own frame rate if usable, otherwise `fallback`.
    pub fn frame_rate_or(&self, fallback: f64) -> f64 {
        self.frame_rate
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(fallback)
    }
}

/// One GPS fix. `timestamp` is wall-clock epoch milliseconds, absent when
/// the log entry carried no usable stamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsSample {
    #[serde(default)]
    pub timestamp: Option<i64>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub accuracy: Option<f64>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub altitude: Option<f64>,
    #[serde(default)]
    pub bearing: Option<f64>,
}

impl GpsSample {
    pub fn position(&self) -> Option<LatLng> {
        LatLng::new(self.latitude, self.longitude)
    }
}

/// Response wrapper used by every backend endpoint.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}
