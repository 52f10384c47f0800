//! Resource types exchanged with the time tracking API.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

pub type EntityId = u64;

/// Anything with an id and a display name.
pub trait Named {
    fn id(&self) -> EntityId;
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl Named for User {
    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Activity {
    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewActivity {
    pub name: String,
}

/// A foreign key that list endpoints expand into the full entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Related<T> {
    Id(EntityId),
    Embedded(T),
}

impl<T: Named> Related<T> {
    pub fn id(&self) -> EntityId {
        match self {
            Related::Id(id) => *id,
            Related::Embedded(entity) => entity.id(),
        }
    }

    /// The embedded name, if the server sent one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Related::Id(_) => None,
            Related::Embedded(entity) => Some(entity.name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: EntityId,
    pub user: Related<User>,
    pub activity: Related<Activity>,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    #[serde(default)]
    pub comment: Option<String>,
    /// Seconds, computed server-side
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl Track {
    /// Calendar date of the start time, in the offset it was recorded with.
    pub fn start_date(&self) -> NaiveDate {
        self.start_time.date_naive()
    }

    pub fn duration_minutes(&self) -> f64 {
        match self.duration {
            Some(seconds) => seconds / 60.0,
            None => (self.end_time - self.start_time).num_seconds() as f64 / 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTrack {
    pub user: EntityId,
    pub activity: EntityId,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// One page of a list endpoint.
///
/// A bare JSON array decodes as a single complete page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PageWire<T>")]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            count: 0,
            next: None,
            previous: None,
            results: Vec::new(),
        }
    }
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageWire<T> {
    Paginated {
        count: u64,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
        results: Vec<T>,
    },
    List(Vec<T>),
}

impl<T> From<PageWire<T>> for Page<T> {
    fn from(wire: PageWire<T>) -> Self {
        match wire {
            PageWire::Paginated {
                count,
                next,
                previous,
                results,
            } => Page {
                count,
                next,
                previous,
                results,
            },
            PageWire::List(results) => Page {
                count: results.len() as u64,
                next: None,
                previous: None,
                results,
            },
        }
    }
}

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Filter and pagination cursor for the tracks list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl TrackQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Self::default()
        }
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn params(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        if let Some(date) = self.date {
            params.insert("date".to_string(), date.format(DATE_FORMAT).to_string());
        }
        if let Some(start) = self.start {
            params.insert("start".to_string(), start.format(DATE_FORMAT).to_string());
        }
        if let Some(end) = self.end {
            params.insert("end".to_string(), end.format(DATE_FORMAT).to_string());
        }
        if let Some(page) = self.page {
            params.insert("page".to_string(), page.to_string());
        }
        params
    }

    /// Whether a track would be listed on the first page of this query.
    ///
    /// Later pages never admit new tracks; the list is newest-first.
    pub fn admits(&self, track: &Track) -> bool {
        if self.page.is_some_and(|page| page > 1) {
            return false;
        }
        let day = track.start_date();
        if self.date.is_some_and(|date| date != day) {
            return false;
        }
        if self.start.is_some_and(|start| day < start) {
            return false;
        }
        if self.end.is_some_and(|end| day > end) {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecapMode {
    Daily,
    Weekly,
    Monthly,
}

impl RecapMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecapMode::Daily => "daily",
            RecapMode::Weekly => "weekly",
            RecapMode::Monthly => "monthly",
        }
    }
}

impl fmt::Display for RecapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecapMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(RecapMode::Daily),
            "weekly" => Ok(RecapMode::Weekly),
            "monthly" => Ok(RecapMode::Monthly),
            other => Err(format!(
                "invalid recap mode '{}': use daily, weekly, or monthly",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

/// A recap request. Parameters left empty mean "the current period".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecapQuery {
    pub mode: RecapMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<YearMonth>,
}

impl RecapQuery {
    pub fn current(mode: RecapMode) -> Self {
        Self {
            mode,
            date: None,
            week_start: None,
            month: None,
        }
    }

    pub fn daily(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Self::current(RecapMode::Daily)
        }
    }

    pub fn weekly(week_start: NaiveDate) -> Self {
        Self {
            week_start: Some(week_start),
            ..Self::current(RecapMode::Weekly)
        }
    }

    pub fn monthly(year: i32, month: u32) -> Self {
        Self {
            month: Some(YearMonth { year, month }),
            ..Self::current(RecapMode::Monthly)
        }
    }

    /// Query parameters relevant to the mode; the others are never sent.
    pub fn params(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        match self.mode {
            RecapMode::Daily => {
                if let Some(date) = self.date {
                    params.insert("date".to_string(), date.format(DATE_FORMAT).to_string());
                }
            }
            RecapMode::Weekly => {
                if let Some(week_start) = self.week_start {
                    params.insert(
                        "week_start".to_string(),
                        week_start.format(DATE_FORMAT).to_string(),
                    );
                }
            }
            RecapMode::Monthly => {
                if let Some(YearMonth { year, month }) = self.month {
                    params.insert("year".to_string(), year.to_string());
                    params.insert("month".to_string(), month.to_string());
                }
            }
        }
        params
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecapEntry {
    pub activity: String,
    pub minutes: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
}

/// Minutes per activity over one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RecapWire")]
pub struct Recap {
    pub mode: RecapMode,
    pub label: Option<String>,
    pub start: String,
    pub end: String,
    pub total_minutes: f64,
    pub entries: Vec<RecapEntry>,
    pub tracks_count: Option<u64>,
}

impl Recap {
    /// The server's label, or one built from the period.
    pub fn display_label(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => format!("{} recap from {}", self.mode, self.start),
        }
    }
}

#[derive(Deserialize)]
struct RecapPeriod {
    start: String,
    end: String,
}

#[derive(Deserialize)]
struct RecapWire {
    mode: RecapMode,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    end: Option<String>,
    #[serde(default)]
    period: Option<RecapPeriod>,
    #[serde(default)]
    total_minutes: f64,
    #[serde(default, alias = "activities")]
    entries: Vec<RecapEntry>,
    #[serde(default)]
    tracks_count: Option<u64>,
}

impl From<RecapWire> for Recap {
    fn from(wire: RecapWire) -> Self {
        let (period_start, period_end) = match wire.period {
            Some(period) => (Some(period.start), Some(period.end)),
            None => (None, None),
        };
        Recap {
            mode: wire.mode,
            label: wire.label,
            start: wire.start.or(period_start).unwrap_or_default(),
            end: wire.end.or(period_end).unwrap_or_default(),
            total_minutes: wire.total_minutes,
            entries: wire.entries,
            tracks_count: wire.tracks_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn track_at(start: &str) -> Track {
        serde_json::from_value(json!({
            "id": 1,
            "user": 1,
            "activity": 2,
            "start_time": start,
            "end_time": start,
        }))
        .unwrap()
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn track_decodes_ids_and_embedded_entities() {
        let track: Track = serde_json::from_value(json!({
            "id": 9,
            "user": {"id": 1, "name": "Ada"},
            "activity": 4,
            "start_time": "2024-05-01T09:00:00+02:00",
            "end_time": "2024-05-01T10:30:00+02:00",
            "comment": null,
            "duration": 5400.0
        }))
        .unwrap();

        assert_eq!(track.user.id(), 1);
        assert_eq!(track.user.name(), Some("Ada"));
        assert_eq!(track.activity.id(), 4);
        assert_eq!(track.activity.name(), None);
        assert_eq!(track.duration_minutes(), 90.0);
    }

    #[test]
    fn start_date_uses_recorded_offset() {
        let track = track_at("2024-05-01T23:30:00-02:00");
        assert_eq!(track.start_date(), day("2024-05-01"));
    }

    #[test]
    fn page_accepts_paginated_and_plain_lists() {
        let paginated: Page<User> = serde_json::from_value(json!({
            "count": 12,
            "next": "http://api/users/?page=2",
            "previous": null,
            "results": [{"id": 1, "name": "Ada"}]
        }))
        .unwrap();
        assert_eq!(paginated.count, 12);
        assert!(paginated.next.is_some());
        assert_eq!(paginated.len(), 1);

        let plain: Page<User> =
            serde_json::from_value(json!([{"id": 1, "name": "Ada"}, {"id": 2, "name": "Bo"}]))
                .unwrap();
        assert_eq!(plain.count, 2);
        assert!(plain.next.is_none());
    }

    #[test]
    fn track_query_params() {
        let query = TrackQuery::for_date(day("2024-05-01")).with_page(2);
        let params = query.params();
        assert_eq!(params.get("date").map(String::as_str), Some("2024-05-01"));
        assert_eq!(params.get("page").map(String::as_str), Some("2"));
        assert!(TrackQuery::all().params().is_empty());
    }

    #[test]
    fn track_query_admits_by_date_and_range() {
        let track = track_at("2024-05-01T09:00:00+00:00");

        assert!(TrackQuery::all().admits(&track));
        assert!(TrackQuery::for_date(day("2024-05-01")).admits(&track));
        assert!(!TrackQuery::for_date(day("2024-05-02")).admits(&track));
        assert!(TrackQuery::between(day("2024-04-01"), day("2024-05-01")).admits(&track));
        assert!(!TrackQuery::between(day("2024-05-02"), day("2024-05-09")).admits(&track));
        assert!(!TrackQuery::all().with_page(2).admits(&track));
    }

    #[test]
    fn recap_query_sends_only_mode_params() {
        let mut query = RecapQuery::weekly(day("2024-04-29"));
        query.date = Some(day("2024-05-01"));
        let params = query.params();
        assert_eq!(params.len(), 1);
        assert_eq!(
            params.get("week_start").map(String::as_str),
            Some("2024-04-29")
        );

        let monthly = RecapQuery::monthly(2024, 5).params();
        assert_eq!(monthly.get("year").map(String::as_str), Some("2024"));
        assert_eq!(monthly.get("month").map(String::as_str), Some("5"));

        assert!(RecapQuery::current(RecapMode::Daily).params().is_empty());
    }

    #[test]
    fn recap_decodes_both_payload_shapes() {
        let flat: Recap = serde_json::from_value(json!({
            "mode": "daily",
            "label": "Wed 1 May",
            "start": "2024-05-01",
            "end": "2024-05-02",
            "total_minutes": 90.0,
            "entries": [{"activity": "Coding", "minutes": 90.0}]
        }))
        .unwrap();
        assert_eq!(flat.display_label(), "Wed 1 May");
        assert_eq!(flat.entries.len(), 1);

        let backend: Recap = serde_json::from_value(json!({
            "mode": "weekly",
            "period": {"start": "2024-04-29T00:00:00+00:00", "end": "2024-05-06T00:00:00+00:00"},
            "total_minutes": 120.5,
            "activities": [
                {"activity": "Coding", "minutes": 100.0, "percentage": 82.99},
                {"activity": "Review", "minutes": 20.5, "percentage": 17.01}
            ],
            "tracks_count": 3
        }))
        .unwrap();
        assert_eq!(backend.mode, RecapMode::Weekly);
        assert_eq!(backend.start, "2024-04-29T00:00:00+00:00");
        assert_eq!(backend.entries[1].activity, "Review");
        assert_eq!(backend.tracks_count, Some(3));
        assert!(backend.display_label().starts_with("weekly recap"));
    }

    #[test]
    fn recap_mode_parses() {
        assert_eq!("monthly".parse::<RecapMode>().unwrap(), RecapMode::Monthly);
        assert!("yearly".parse::<RecapMode>().is_err());
    }
}
