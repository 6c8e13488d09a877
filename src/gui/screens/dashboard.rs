use std::fmt;
use std::sync::Arc;

use iced::{
    Element, Length, Task,
    widget::{Column, column, pick_list, row, scrollable, text},
};

use crate::{
    dataset::{
        Dataset, DateFilter, IdFilter, RecordFilter, VehicleCounts,
        aggregate::{format_thai_datetime, hourly_buckets, thai_date_label, total},
    },
    gui::{
        AppState,
        screens::Screen,
        widgets::{MUTED_COLOR, bar_row, metric_card, panel},
    },
    render::format_confidence,
};

const ALL_LABEL: &str = "ทั้งหมด";

/// A pick-list entry: the filter value plus its display label.
#[derive(Debug, Clone, PartialEq)]
pub struct Choice<T> {
    pub value: T,
    pub label: String,
}

impl<T> fmt::Display for Choice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

#[derive(Debug, Clone)]
pub enum DashboardMessage {
    DateSelected(Choice<DateFilter>),
    CameraSelected(Choice<IdFilter>),
    VehicleTypeSelected(Choice<IdFilter>),
}

pub struct DashboardScreen {
    dataset: Arc<Dataset>,
    filter: RecordFilter,
    dates: Vec<Choice<DateFilter>>,
    cameras: Vec<Choice<IdFilter>>,
    vehicle_types: Vec<Choice<IdFilter>>,
}

impl DashboardScreen {
    pub fn new(state: &AppState) -> Self {
        let dataset = state.dataset.clone();
        let available = dataset.available_dates();

        let dates = std::iter::once(Choice { value: DateFilter::All, label: ALL_LABEL.to_string() })
            .chain(available.iter().map(|&date| Choice {
                value: DateFilter::On(date),
                label: thai_date_label(date),
            }))
            .collect();
        let cameras = id_choices(dataset.cameras.iter().map(|c| (c.id, c.name.as_str())));
        let vehicle_types = id_choices(dataset.vehicle_types.iter().map(|t| (t.id, t.name.as_str())));

        let filter = RecordFilter {
            date: available.first().map_or(DateFilter::All, |&d| DateFilter::On(d)),
            ..RecordFilter::default()
        };

        Self {
            dataset,
            filter,
            dates,
            cameras,
            vehicle_types,
        }
    }

    pub fn filter(&self) -> RecordFilter {
        self.filter
    }

    /// Counts behind the "today" chart. Empty unless a single day is
    /// selected, matching the daily metric card.
    pub fn today_counts(&self) -> Option<&VehicleCounts> {
        self.filter.date.date().and_then(|date| self.dataset.daily_counts(date))
    }

    fn filters(&self) -> Element<'_, DashboardMessage> {
        let date = selected(&self.dates, &self.filter.date);
        let camera = selected(&self.cameras, &self.filter.camera);
        let vehicle_type = selected(&self.vehicle_types, &self.filter.vehicle_type);
        let body = row![
            labelled(
                "วันที่",
                pick_list(self.dates.as_slice(), date, DashboardMessage::DateSelected).width(Length::Fill),
            ),
            labelled(
                "กล้อง",
                pick_list(self.cameras.as_slice(), camera, DashboardMessage::CameraSelected).width(Length::Fill),
            ),
            labelled(
                "ประเภทยานพาหนะ",
                pick_list(self.vehicle_types.as_slice(), vehicle_type, DashboardMessage::VehicleTypeSelected)
                    .width(Length::Fill),
            ),
        ]
        .spacing(16);
        panel("ตัวกรอง", body)
    }

    fn share_chart(&self) -> Element<'_, DashboardMessage> {
        let body: Element<'_, DashboardMessage> = match self.today_counts() {
            Some(counts) => {
                let sum = total(counts).max(1);
                let rows = counts.iter().map(|(name, &count)| {
                    let share = count as f32 * 100.0 / sum as f32;
                    bar_row(format!("{name} ({share:.0}%)"), count, sum)
                });
                Column::with_children(rows).spacing(8).into()
            }
            None => no_data(),
        };
        panel("สัดส่วนยานพาหนะ (วันนี้)", body)
    }

    fn weekly_chart(&self) -> Element<'_, DashboardMessage> {
        let body: Element<'_, DashboardMessage> = match self.dataset.weekly_counts() {
            Some(counts) => {
                let max = counts.values().copied().max().unwrap_or(0);
                Column::with_children(counts.iter().map(|(name, &count)| bar_row(name.clone(), count, max)))
                    .spacing(8)
                    .into()
            }
            None => no_data(),
        };
        panel("จำนวนยานพาหนะ (สัปดาห์นี้)", body)
    }

    fn hourly_chart(&self) -> Element<'_, DashboardMessage> {
        let records = self.filter.apply(&self.dataset.records);
        let buckets = hourly_buckets(records);
        let body: Element<'_, DashboardMessage> = if buckets.is_empty() {
            no_data()
        } else {
            let max = buckets.iter().map(|b| b.count).max().unwrap_or(0) as u32;
            Column::with_children(buckets.iter().map(|b| bar_row(b.label(), b.count as u32, max)))
                .spacing(8)
                .into()
        };
        panel("จำนวนรถรายชั่วโมง", body)
    }

    fn records_table(&self) -> Element<'_, DashboardMessage> {
        let records = self.filter.apply(&self.dataset.records);
        let header = table_row(
            "ID".to_string(),
            "เวลา".to_string(),
            "กล้อง".to_string(),
            "ประเภท".to_string(),
            "ความมั่นใจ".to_string(),
        );
        let mut table = Column::new().spacing(6).push(header);
        if records.is_empty() {
            table = table.push(no_data());
        }
        for record in records {
            table = table.push(table_row(
                record.id.to_string(),
                format_thai_datetime(record.timestamp),
                self.dataset.camera_name(record.camera_id).to_string(),
                self.dataset.vehicle_type_name(record.vehicle_type_id).to_string(),
                format_confidence(record.confidence),
            ));
        }
        panel("บันทึกการตรวจจับ", table)
    }
}

fn id_choices<'a>(items: impl Iterator<Item = (u32, &'a str)>) -> Vec<Choice<IdFilter>> {
    std::iter::once(Choice { value: IdFilter::All, label: ALL_LABEL.to_string() })
        .chain(items.map(|(id, name)| Choice {
            value: IdFilter::Specific(id),
            label: name.to_string(),
        }))
        .collect()
}

fn selected<T: PartialEq + Clone>(choices: &[Choice<T>], value: &T) -> Option<Choice<T>> {
    choices.iter().find(|c| c.value == *value).cloned()
}

fn labelled<'a>(label: &'a str, control: impl Into<Element<'a, DashboardMessage>>) -> Element<'a, DashboardMessage> {
    column![text(label).size(13).color(MUTED_COLOR), control.into()]
        .spacing(4)
        .width(Length::FillPortion(1))
        .into()
}

fn table_row<'a>(
    id: String,
    time: String,
    camera: String,
    vehicle_type: String,
    confidence: String,
) -> Element<'a, DashboardMessage> {
    row![
        text(id).width(Length::FillPortion(1)),
        text(time).width(Length::FillPortion(3)),
        text(camera).width(Length::FillPortion(3)),
        text(vehicle_type).width(Length::FillPortion(2)),
        text(confidence).width(Length::FillPortion(2)),
    ]
    .spacing(10)
    .into()
}

fn no_data<'a>() -> Element<'a, DashboardMessage> {
    text("ไม่มีข้อมูล").color(MUTED_COLOR).into()
}

impl Screen for DashboardScreen {
    type Message = DashboardMessage;

    fn view(&self) -> Element<'_, DashboardMessage> {
        let cards = self.dataset.metric_cards(&self.filter);
        let metrics = row![
            metric_card("รวมวันนี้", cards.daily_total.to_string()),
            metric_card("รวมสัปดาห์นี้", cards.weekly_total.to_string()),
            metric_card("บันทึกรถ (หลังกรอง)", cards.filtered_records.to_string()),
        ]
        .spacing(16);

        let charts = row![
            column![self.share_chart(), self.weekly_chart()]
                .spacing(16)
                .width(Length::FillPortion(1)),
            column![self.hourly_chart()].width(Length::FillPortion(1)),
        ]
        .spacing(16);

        scrollable(column![metrics, self.filters(), charts, self.records_table()].spacing(16)).into()
    }

    fn update(&mut self, message: DashboardMessage, _state: &mut AppState) -> Task<DashboardMessage> {
        match message {
            DashboardMessage::DateSelected(choice) => self.filter.date = choice.value,
            DashboardMessage::CameraSelected(choice) => self.filter.camera = choice.value,
            DashboardMessage::VehicleTypeSelected(choice) => self.filter.vehicle_type = choice.value,
        }
        tracing::debug!(filter = ?self.filter, "dashboard filter changed");
        Task::none()
    }
}
