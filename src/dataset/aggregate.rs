use std::collections::BTreeMap;
use std::str::FromStr;

use time::{Date, Month, PrimitiveDateTime};

use super::{Dataset, DetectionRecord, VehicleCounts, parse_date};

/// Fallback label when an id has no matching catalog row.
pub const UNSPECIFIED: &str = "ไม่ระบุ";

const ALL_KEYWORD: &str = "all";

/// Filter on a numeric foreign key; `All` disables the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdFilter {
    #[default]
    All,
    Specific(u32),
}

impl IdFilter {
    pub fn matches(self, id: u32) -> bool {
        match self {
            IdFilter::All => true,
            IdFilter::Specific(wanted) => wanted == id,
        }
    }
}

impl FromStr for IdFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case(ALL_KEYWORD) {
            return Ok(IdFilter::All);
        }
        let id = s
            .parse()
            .map_err(|_| anyhow::anyhow!("Expected \"all\" or a numeric id, got {s:?}"))?;
        Ok(IdFilter::Specific(id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFilter {
    #[default]
    All,
    On(Date),
}

impl DateFilter {
    pub fn matches(self, timestamp: PrimitiveDateTime) -> bool {
        match self {
            DateFilter::All => true,
            DateFilter::On(date) => timestamp.date() == date,
        }
    }

    pub fn date(self) -> Option<Date> {
        match self {
            DateFilter::All => None,
            DateFilter::On(date) => Some(date),
        }
    }
}

impl FromStr for DateFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case(ALL_KEYWORD) {
            Ok(DateFilter::All)
        } else {
            Ok(DateFilter::On(parse_date(s)?))
        }
    }
}

/// Dashboard filter selection. Filters compose as a logical AND.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordFilter {
    pub date: DateFilter,
    pub camera: IdFilter,
    pub vehicle_type: IdFilter,
}

impl RecordFilter {
    /// Date, then camera, then vehicle type.
    pub fn apply<'a>(&self, records: &'a [DetectionRecord]) -> Vec<&'a DetectionRecord> {
        records
            .iter()
            .filter(|r| self.date.matches(r.timestamp))
            .filter(|r| self.camera.matches(r.camera_id))
            .filter(|r| self.vehicle_type.matches(r.vehicle_type_id))
            .collect()
    }
}

/// Number of records seen during one hour of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourBucket {
    pub hour: u8,
    pub count: usize,
}

impl HourBucket {
    /// Zero-padded `HH:00` axis label.
    pub fn label(&self) -> String {
        format!("{:02}:00", self.hour)
    }
}

/// Count records per local hour of day, ascending by hour.
pub fn hourly_buckets<'a, I>(records: I) -> Vec<HourBucket>
where
    I: IntoIterator<Item = &'a DetectionRecord>,
{
    let mut buckets: BTreeMap<u8, usize> = BTreeMap::new();
    for record in records {
        *buckets.entry(record.timestamp.hour()).or_default() += 1;
    }
    buckets
        .into_iter()
        .map(|(hour, count)| HourBucket { hour, count })
        .collect()
}

pub fn total(counts: &VehicleCounts) -> u32 {
    counts.values().sum()
}

/// Headline numbers shown above the dashboard charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricCards {
    pub daily_total: u32,
    pub weekly_total: u32,
    pub filtered_records: usize,
}

impl Dataset {
    pub fn vehicle_type_name(&self, id: u32) -> &str {
        self.vehicle_types
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.name.as_str())
            .unwrap_or(UNSPECIFIED)
    }

    pub fn camera_name(&self, id: u32) -> &str {
        self.cameras
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
            .unwrap_or(UNSPECIFIED)
    }

    /// Per-category counts for one day, if that day has a total.
    pub fn daily_counts(&self, date: Date) -> Option<&VehicleCounts> {
        self.daily_totals
            .iter()
            .find(|d| d.date == date)
            .map(|d| &d.vehicle_counts)
    }

    /// Counts for the current week, which is the first weekly entry.
    pub fn weekly_counts(&self) -> Option<&VehicleCounts> {
        self.weekly_totals.first().map(|w| &w.vehicle_counts)
    }

    pub fn metric_cards(&self, filter: &RecordFilter) -> MetricCards {
        let daily_total = filter
            .date
            .date()
            .and_then(|date| self.daily_counts(date))
            .map(total)
            .unwrap_or(0);
        MetricCards {
            daily_total,
            weekly_total: self.weekly_counts().map(total).unwrap_or(0),
            filtered_records: filter.apply(&self.records).len(),
        }
    }
}

fn thai_month(month: Month) -> &'static str {
    match month {
        Month::January => "มกราคม",
        Month::February => "กุมภาพันธ์",
        Month::March => "มีนาคม",
        Month::April => "เมษายน",
        Month::May => "พฤษภาคม",
        Month::June => "มิถุนายน",
        Month::July => "กรกฎาคม",
        Month::August => "สิงหาคม",
        Month::September => "กันยายน",
        Month::October => "ตุลาคม",
        Month::November => "พฤศจิกายน",
        Month::December => "ธันวาคม",
    }
}

/// Long date label used by the date picker, e.g. `21 กรกฎาคม 2025`.
pub fn thai_date_label(date: Date) -> String {
    format!("{} {} {}", date.day(), thai_month(date.month()), date.year())
}

/// Thai locale date-time in the Buddhist era, e.g. `21/7/2568 08:15:00`.
pub fn format_thai_datetime(ts: PrimitiveDateTime) -> String {
    format!(
        "{}/{}/{} {:02}:{:02}:{:02}",
        ts.day(),
        u8::from(ts.month()),
        ts.year() + 543,
        ts.hour(),
        ts.minute(),
        ts.second()
    )
}
