//! Static catalog backing the statistics dashboard.
//!
//! The dataset is parsed once from an embedded JSON document and is never
//! mutated afterwards; consumers share it behind an `Arc`.

pub mod aggregate;

use std::collections::BTreeMap;

use anyhow::Context;
use serde::{Deserialize, Deserializer};
use time::{Date, PrimitiveDateTime, format_description::BorrowedFormatItem, macros::format_description};

pub use aggregate::{DateFilter, HourBucket, IdFilter, MetricCards, RecordFilter, UNSPECIFIED};

const BUILTIN_JSON: &str = include_str!("../../data/mock_data.json");

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Per-category vehicle counts keyed by localized vehicle type name.
pub type VehicleCounts = BTreeMap<String, u32>;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VehicleType {
    #[serde(rename = "ID_Type")]
    pub id: u32,
    #[serde(rename = "Name_Thai")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Camera {
    #[serde(rename = "ID_Camera")]
    pub id: u32,
    #[serde(rename = "Camera_Name")]
    pub name: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Zone")]
    pub zone: String,
    #[serde(rename = "RTSP_Camera")]
    pub stream_uri: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DetectionRecord {
    #[serde(rename = "ID_Car")]
    pub id: u32,
    #[serde(rename = "ID_Type")]
    pub vehicle_type_id: u32,
    #[serde(rename = "ID_Camera")]
    pub camera_id: u32,
    /// Local wall-clock time, no offset attached.
    #[serde(rename = "Time_Stamp", deserialize_with = "deserialize_timestamp")]
    pub timestamp: PrimitiveDateTime,
    #[serde(rename = "Confidence_Score")]
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DailyTotal {
    #[serde(deserialize_with = "deserialize_date")]
    pub date: Date,
    pub vehicle_counts: VehicleCounts,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeeklyTotal {
    /// ISO week label such as `2025-W29`.
    pub week: String,
    pub vehicle_counts: VehicleCounts,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Dataset {
    pub vehicle_types: Vec<VehicleType>,
    pub cameras: Vec<Camera>,
    #[serde(rename = "detected_vehicles")]
    pub records: Vec<DetectionRecord>,
    #[serde(rename = "total_daily")]
    pub daily_totals: Vec<DailyTotal>,
    #[serde(rename = "total_weekly")]
    pub weekly_totals: Vec<WeeklyTotal>,
}

impl Dataset {
    /// Parse the catalog bundled with the binary.
    pub fn builtin() -> anyhow::Result<Self> {
        Self::from_json(BUILTIN_JSON).context("Failed to parse built-in dataset")
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Dates that have a daily total, in catalog order.
    pub fn available_dates(&self) -> Vec<Date> {
        self.daily_totals.iter().map(|d| d.date).collect()
    }
}

/// Parse a `YYYY-MM-DD` date as used by the date filter.
pub fn parse_date(input: &str) -> anyhow::Result<Date> {
    Date::parse(input, DATE_FORMAT).with_context(|| format!("Invalid date: {input}"))
}

pub fn parse_timestamp(input: &str) -> anyhow::Result<PrimitiveDateTime> {
    PrimitiveDateTime::parse(input, TIMESTAMP_FORMAT)
        .with_context(|| format!("Invalid timestamp: {input}"))
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<PrimitiveDateTime, D::Error> {
    let raw = String::deserialize(d)?;
    PrimitiveDateTime::parse(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
}

fn deserialize_date<'de, D: Deserializer<'de>>(d: D) -> Result<Date, D::Error> {
    let raw = String::deserialize(d)?;
    Date::parse(&raw, DATE_FORMAT).map_err(serde::de::Error::custom)
}
