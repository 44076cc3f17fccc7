//! Normalizes the loosely-typed payloads of the backend services into the
//! canonical record types.
//!
//! Every function here is pure. Records with coordinates that do not parse as
//! finite numbers are dropped; that is a filtering policy, not an error.

use crate::domain::{
    AnalysisResult, Category, ComplaintRecord, Coordinates, Detection, DetectionReport,
    HistoryEntry, HotspotRecord, RecordId, RecordSource, ServerHistoryItem, Timeline, Urgency,
};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;

const LATITUDE_KEYS: &[&str] = &["latitude", "lat", "Latitude"];
const LONGITUDE_KEYS: &[&str] = &["longitude", "lng", "lon", "Longitude"];
const CATEGORY_KEYS: &[&str] = &["category", "Category"];
const URGENCY_KEYS: &[&str] = &["urgency", "Urgency", "avg_urgency_label"];
const AREA_KEYS: &[&str] = &["area", "Area"];
const TEXT_KEYS: &[&str] = &[
    "text",
    "ComplaintText",
    "complaint_text",
    "sample_text",
    "question",
    "description",
];

const UNKNOWN_AREA: &str = "Unknown Area";

/// Returns the first non-null value stored under any of `keys`.
fn field<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

fn has_any(object: &Map<String, Value>, keys: &[&str]) -> bool {
    keys.iter().any(|key| object.contains_key(*key))
}

fn string_field(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    match field(object, keys)? {
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Parses a JSON number or numeric string. Non-finite results are rejected.
pub fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Reads a latitude/longitude pair under any of the known field spellings.
pub fn parse_coordinates(object: &Map<String, Value>) -> Option<Coordinates> {
    let latitude = parse_number(field(object, LATITUDE_KEYS)?)?;
    let longitude = parse_number(field(object, LONGITUDE_KEYS)?)?;
    Coordinates::new(latitude, longitude)
}

fn parse_id(object: &Map<String, Value>, fallback: usize) -> RecordId {
    match object.get("id") {
        Some(Value::Number(number)) => number
            .as_i64()
            .map_or_else(|| RecordId::Text(number.to_string()), RecordId::Number),
        Some(Value::String(text)) if !text.trim().is_empty() => RecordId::Text(text.clone()),
        _ => RecordId::Number(i64::try_from(fallback).unwrap_or(i64::MAX)),
    }
}

/// Accepts either a bare array or an object wrapping the array under
/// `envelope`. Anything else yields no records.
fn records<'a>(payload: &'a Value, envelope: &str) -> &'a [Value] {
    match payload {
        Value::Array(items) => items,
        Value::Object(object) => match object.get(envelope) {
            Some(Value::Array(items)) => items,
            _ => &[],
        },
        _ => &[],
    }
}

fn urgency_or(object: &Map<String, Value>, default: Urgency) -> Urgency {
    string_field(object, URGENCY_KEYS)
        .and_then(|label| Urgency::parse(&label))
        .unwrap_or(default)
}

/// Maps an aggregated urgency score (1 = Low .. 3 = High) back to a label.
pub fn urgency_from_score(score: f64) -> Urgency {
    if score >= 2.5 {
        Urgency::High
    } else if score >= 1.5 {
        Urgency::Medium
    } else {
        Urgency::Low
    }
}

/// `GET /complaints/map`
pub fn complaints_from_map(payload: &Value) -> Vec<ComplaintRecord> {
    records(payload, "data")
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let object = item.as_object()?;
            let coordinates = parse_coordinates(object)?;
            Some(ComplaintRecord {
                id: parse_id(object, index),
                coordinates,
                category: string_field(object, CATEGORY_KEYS)
                    .map_or(Category::Unknown, |label| Category::parse(&label)),
                urgency: urgency_or(object, Urgency::Medium),
                area: string_field(object, AREA_KEYS).unwrap_or_else(|| UNKNOWN_AREA.to_string()),
                text: string_field(object, TEXT_KEYS).unwrap_or_default(),
                source: RecordSource::LiveMap,
            })
        })
        .collect()
}

/// `GET /hotspots`
pub fn hotspots_from_payload(payload: &Value) -> Vec<HotspotRecord> {
    records(payload, "hotspots")
        .iter()
        .filter_map(|item| {
            let object = item.as_object()?;
            let coordinates = parse_coordinates(object)?;
            let avg_urgency_score = object.get("avg_urgency_score").and_then(parse_number);
            let avg_urgency = string_field(object, &["avg_urgency_label", "urgency"])
                .and_then(|label| Urgency::parse(&label))
                .or_else(|| avg_urgency_score.map(urgency_from_score))
                .unwrap_or(Urgency::Low);

            Some(HotspotRecord {
                area: string_field(object, AREA_KEYS).unwrap_or_else(|| UNKNOWN_AREA.to_string()),
                coordinates,
                count: object.get("count").map_or(0, parse_count),
                avg_urgency,
                avg_urgency_score,
                sample_text: string_field(object, TEXT_KEYS).unwrap_or_default(),
            })
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_count(value: &Value) -> u32 {
    parse_number(value).map_or(0, |count| count.clamp(0.0, f64::from(u32::MAX)).round() as u32)
}

fn parse_detections(value: Option<&Value>) -> Vec<Detection> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect(),
        _ => Vec::new(),
    }
}

/// `GET /history`. Items are kept even without coordinates because the
/// history view lists them; only the map needs a position.
pub fn history_items_from_payload(payload: &Value) -> Vec<ServerHistoryItem> {
    records(payload, "history")
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let object = item.as_object()?;
            Some(ServerHistoryItem {
                id: parse_id(object, index),
                category: string_field(object, CATEGORY_KEYS)
                    .map_or(Category::Unknown, |label| Category::parse(&label)),
                urgency: string_field(object, URGENCY_KEYS).and_then(|label| Urgency::parse(&label)),
                area: string_field(object, AREA_KEYS).unwrap_or_else(|| UNKNOWN_AREA.to_string()),
                image: string_field(object, &["image"]),
                yolo_boxes: parse_detections(object.get("yolo_boxes")),
                timestamp: string_field(object, &["timestamp", "created"]).unwrap_or_default(),
                coordinates: parse_coordinates(object),
            })
        })
        .collect()
}

pub fn complaints_from_server_history(items: &[ServerHistoryItem]) -> Vec<ComplaintRecord> {
    items
        .iter()
        .filter_map(|item| {
            Some(ComplaintRecord {
                id: item.id.clone(),
                coordinates: item.coordinates?,
                category: item.category.clone(),
                urgency: item.urgency.unwrap_or(Urgency::Medium),
                area: item.area.clone(),
                text: format!("{} detected ({} boxes)", item.category.label(), item.yolo_boxes.len()),
                source: RecordSource::ServerHistory,
            })
        })
        .collect()
}

/// Places a local analysis on the map. An analysis without a location sits at
/// `fallback`; one whose location is present but unparsable is dropped.
pub fn complaint_from_entry(entry: &HistoryEntry, fallback: Coordinates) -> Option<ComplaintRecord> {
    let coordinates = match entry.result.location.as_ref() {
        None | Some(Value::Null) => fallback,
        Some(Value::Object(location))
            if !has_any(location, LATITUDE_KEYS) && !has_any(location, LONGITUDE_KEYS) =>
        {
            fallback
        }
        Some(Value::Object(location)) => parse_coordinates(location)?,
        Some(_) => return None,
    };

    Some(ComplaintRecord {
        id: RecordId::Number(entry.id),
        coordinates,
        category: entry.result.category(),
        urgency: entry.result.urgency().unwrap_or(Urgency::Medium),
        area: entry
            .result
            .area
            .clone()
            .filter(|area| !area.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_AREA.to_string()),
        text: if entry.question.trim().is_empty() {
            "No description".to_string()
        } else {
            entry.question.clone()
        },
        source: RecordSource::LocalHistory,
    })
}

pub fn complaints_from_entries(entries: &[HistoryEntry], fallback: Coordinates) -> Vec<ComplaintRecord> {
    entries
        .iter()
        .filter_map(|entry| complaint_from_entry(entry, fallback))
        .collect()
}

/// Concatenates record sets into one immutable snapshot. A record that shows
/// up twice under the same source and id is only kept once.
pub fn merge_complaints<'a, I>(sets: I) -> Arc<[ComplaintRecord]>
where
    I: IntoIterator<Item = &'a [ComplaintRecord]>,
{
    let mut seen = HashSet::new();
    sets.into_iter()
        .flatten()
        .filter(|record| seen.insert((record.source, record.id.clone())))
        .cloned()
        .collect()
}

/// `POST /analyze`
pub fn analysis_from_payload(payload: Value) -> Result<AnalysisResult, serde_json::Error> {
    serde_json::from_value(payload)
}

/// Text shown in a recommendation popup.
pub fn recommendation_text(payload: &Value) -> String {
    ["recommended_action", "answer"]
        .iter()
        .find_map(|key| {
            payload
                .get(*key)
                .and_then(Value::as_str)
                .filter(|text| !text.trim().is_empty())
        })
        .map_or_else(
            || serde_json::to_string_pretty(payload).unwrap_or_default(),
            str::to_string,
        )
}

/// `GET /timeline`. Series are aligned to the label count.
pub fn timeline_from_payload(payload: &Value) -> Timeline {
    let Some(object) = payload.as_object() else {
        return Timeline::default();
    };

    let labels: Vec<String> = match object.get("labels") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map_or_else(|| item.to_string(), str::to_string))
            .collect(),
        _ => return Timeline::default(),
    };

    let series = object
        .iter()
        .filter(|(key, _)| key.as_str() != "labels")
        .filter_map(|(key, value)| {
            let Value::Array(items) = value else {
                return None;
            };
            let mut counts: Vec<u64> = items
                .iter()
                .map(|item| u64::from(parse_count(item)))
                .take(labels.len())
                .collect();
            counts.resize(labels.len(), 0);
            Some((key.clone(), counts))
        })
        .collect();

    Timeline { labels, series }
}

/// `POST /yolo`
pub fn detection_report_from_payload(payload: Value) -> Result<DetectionReport, serde_json::Error> {
    serde_json::from_value(payload)
}
