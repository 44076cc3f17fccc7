use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal severity attached to a complaint or hotspot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

impl Urgency {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" | "moderate" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" | "severe" => Some(Self::Critical),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }

    /// High and Critical are treated as priority items across the dashboard.
    pub const fn is_priority(self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Complaint category. The backend vocabulary is open, so unknown labels are
/// kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Pothole,
    Garbage,
    Drainage,
    Hazard,
    Electricity,
    Unknown,
    Other(String),
}

impl Category {
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.to_lowercase().as_str() {
            "pothole" | "potholes" => Self::Pothole,
            "garbage" => Self::Garbage,
            "drainage" => Self::Drainage,
            "hazard" => Self::Hazard,
            "electricity" => Self::Electricity,
            "" | "unknown" => Self::Unknown,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pothole => "pothole",
            Self::Garbage => "garbage",
            Self::Drainage => "drainage",
            Self::Hazard => "hazard",
            Self::Electricity => "electricity",
            Self::Unknown => "unknown",
            Self::Other(label) => label,
        }
    }

    pub fn label(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        chars.next().map_or_else(String::new, |first| {
            first.to_uppercase().chain(chars).collect()
        })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated geographic position. Both components are always finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        if latitude.is_finite() && longitude.is_finite() {
            Some(Self {
                latitude,
                longitude,
            })
        } else {
            None
        }
    }
}

/// Identifier assigned by whichever origin produced the record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordSource {
    LiveMap,
    ServerHistory,
    LocalHistory,
}

/// Canonical complaint shape every endpoint is normalized into.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplaintRecord {
    pub id: RecordId,
    pub coordinates: Coordinates,
    pub category: Category,
    pub urgency: Urgency,
    pub area: String,
    pub text: String,
    pub source: RecordSource,
}

/// Server-aggregated complaint cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct HotspotRecord {
    pub area: String,
    pub coordinates: Coordinates,
    pub count: u32,
    pub avg_urgency: Urgency,
    pub avg_urgency_score: Option<f64>,
    pub sample_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDoc {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub score: Option<f64>,
}

/// A single bounding box from the YOLO service. `x`/`y` are the box centre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(rename = "class", alias = "label", default)]
    pub class: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub urgency: Option<String>,
    #[serde(default)]
    pub recommended_action: Option<String>,
    #[serde(default)]
    pub retrieved: Vec<RetrievedDoc>,
    #[serde(default)]
    pub image_detections: Vec<Detection>,
    #[serde(default)]
    pub annotated_image: Option<String>,
    #[serde(default)]
    pub location: Option<serde_json::Value>,
    #[serde(default)]
    pub area: Option<String>,
}

impl AnalysisResult {
    pub fn category(&self) -> Category {
        self.category
            .as_deref()
            .map_or(Category::Unknown, Category::parse)
    }

    pub fn urgency(&self) -> Option<Urgency> {
        self.urgency.as_deref().and_then(Urgency::parse)
    }
}

/// A persisted analysis submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub question: String,
    pub result: AnalysisResult,
    pub timestamp: String,
}

impl HistoryEntry {
    pub fn new(question: impl Into<String>, result: AnalysisResult) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: now.timestamp_millis(),
            question: question.into(),
            result,
            timestamp: now.to_rfc3339(),
        }
    }
}

/// Item returned by the history service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerHistoryItem {
    pub id: RecordId,
    pub category: Category,
    pub urgency: Option<Urgency>,
    pub area: String,
    pub image: Option<String>,
    pub yolo_boxes: Vec<Detection>,
    pub timestamp: String,
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    #[serde(default)]
    pub detections: Vec<Detection>,
    #[serde(default)]
    pub rendered_image: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Daily incident counts per category, aligned with `labels`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    pub labels: Vec<String>,
    pub series: Vec<(String, Vec<u64>)>,
}

impl Timeline {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
