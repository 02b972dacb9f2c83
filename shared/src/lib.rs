use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod curve;
pub mod scale;
pub mod tooltip;

pub use scale::ChartDomain;
pub use tooltip::Tooltip;

/// One row of the stock price table.
///
/// Field names follow the source columns (`Company`, `Date`, `Open`, `Close`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    #[serde(rename = "Company")]
    pub company: String,
    /// Trading day; timestamps are truncated to their calendar date
    #[serde(rename = "Date", deserialize_with = "deserialize_flexible_date")]
    pub date: NaiveDate,
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "Close")]
    pub close: f64,
}

impl DataPoint {
    pub fn new(company: impl Into<String>, date: NaiveDate, open: f64, close: f64) -> Self {
        Self {
            company: company.into(),
            date,
            open,
            close,
        }
    }

    /// Lowest of open and close
    pub fn low(&self) -> f64 {
        self.open.min(self.close)
    }

    /// Highest of open and close
    pub fn high(&self) -> f64 {
        self.open.max(self.close)
    }

    /// Close minus open
    pub fn diff(&self) -> f64 {
        self.close - self.open
    }
}

/// Parse `YYYY-MM-DD`, an RFC 3339 timestamp, or a naive `YYYY-MM-DDTHH:MM:SS` timestamp
pub fn parse_flexible_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}

fn deserialize_flexible_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flexible_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", raw)))
}

/// Companies offered by the chart's radio group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Company {
    Apple,
    Microsoft,
    Amazon,
    Google,
    Meta,
}

impl Company {
    pub const ALL: [Company; 5] = [
        Company::Apple,
        Company::Microsoft,
        Company::Amazon,
        Company::Google,
        Company::Meta,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Company::Apple => "Apple",
            Company::Microsoft => "Microsoft",
            Company::Amazon => "Amazon",
            Company::Google => "Google",
            Company::Meta => "Meta",
        }
    }
}

impl fmt::Display for Company {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Company {
    type Err = ParseSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Company::ALL
            .iter()
            .copied()
            .find(|company| company.as_str() == s)
            .ok_or_else(|| ParseSelectionError::UnknownCompany(s.to_string()))
    }
}

/// Calendar month, named the way the month dropdown shows it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    pub fn from_date(date: NaiveDate) -> Month {
        // chrono guarantees month() is within 1..=12
        Month::ALL[date.month0() as usize]
    }

    /// Long English name, e.g. "November"
    pub fn name(&self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Month {
    type Err = ParseSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Month::ALL
            .iter()
            .copied()
            .find(|month| month.name() == s)
            .ok_or_else(|| ParseSelectionError::UnknownMonth(s.to_string()))
    }
}

/// Error raised when a form value does not name a known company or month
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseSelectionError {
    #[error("unknown company: {0}")]
    UnknownCompany(String),
    #[error("unknown month: {0}")]
    UnknownMonth(String),
}

/// The company/month pair the user has picked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSelection {
    pub company: Company,
    pub month: Month,
}

impl Default for ChartSelection {
    fn default() -> Self {
        Self {
            company: Company::Apple,
            month: Month::November,
        }
    }
}

impl ChartSelection {
    pub fn new(company: Company, month: Month) -> Self {
        Self { company, month }
    }

    pub fn matches(&self, point: &DataPoint) -> bool {
        point.company == self.company.as_str() && Month::from_date(point.date) == self.month
    }

    /// Subsequence of `points` matching this selection, in input order
    pub fn filter(&self, points: &[DataPoint]) -> Vec<DataPoint> {
        points.iter().filter(|p| self.matches(p)).cloned().collect()
    }
}

/// Layout settings for the price chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Full drawing width in pixels, margins included
    pub width: u32,
    /// Full drawing height in pixels, margins included
    pub height: u32,
    pub margin_top: u32,
    pub margin_right: u32,
    /// Space under the plot for the x axis and its labels
    pub margin_bottom: u32,
    /// Space left of the plot for the y axis and its labels
    pub margin_left: u32,
    pub marker_radius: u32,
    pub y_tick_count: usize,
    pub tooltip_offset_x: i32,
    pub tooltip_offset_y: i32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 700,
            height: 400,
            margin_top: 20,
            margin_right: 30,
            margin_bottom: 60,
            margin_left: 40,
            marker_radius: 3,
            y_tick_count: 10,
            tooltip_offset_x: 10,
            tooltip_offset_y: -10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_points() -> Vec<DataPoint> {
        vec![
            DataPoint::new("Apple", day(2023, 11, 1), 100.0, 105.0),
            DataPoint::new("Microsoft", day(2023, 11, 1), 330.0, 332.5),
            DataPoint::new("Apple", day(2023, 10, 31), 98.0, 99.5),
            DataPoint::new("Apple", day(2023, 11, 2), 105.0, 103.0),
            DataPoint::new("Apple", day(2022, 11, 15), 80.0, 81.0),
        ]
    }

    #[test]
    fn test_filter_keeps_matching_subsequence_in_order() {
        let points = sample_points();
        let filtered = ChartSelection::default().filter(&points);

        // November of any year matches; only the month name is compared
        assert_eq!(filtered.len(), 3);
        assert_eq!(filtered[0], points[0]);
        assert_eq!(filtered[1], points[3]);
        assert_eq!(filtered[2], points[4]);
    }

    #[test]
    fn test_filter_by_company() {
        let points = sample_points();
        let selection = ChartSelection::new(Company::Microsoft, Month::November);
        let filtered = selection.filter(&points);
        assert_eq!(filtered, vec![points[1].clone()]);
    }

    #[test]
    fn test_filter_without_matches_is_empty() {
        let selection = ChartSelection::new(Company::Meta, Month::March);
        assert!(selection.filter(&sample_points()).is_empty());
        assert!(selection.filter(&[]).is_empty());
    }

    #[test]
    fn test_default_selection() {
        let selection = ChartSelection::default();
        assert_eq!(selection.company, Company::Apple);
        assert_eq!(selection.month, Month::November);
    }

    #[test]
    fn test_company_parsing() {
        for company in Company::ALL {
            assert_eq!(company.as_str().parse::<Company>().unwrap(), company);
        }
        assert_eq!(
            "apple".parse::<Company>(),
            Err(ParseSelectionError::UnknownCompany("apple".to_string()))
        );
    }

    #[test]
    fn test_month_names_and_dates() {
        assert_eq!(Month::from_date(day(2024, 1, 1)), Month::January);
        assert_eq!(Month::from_date(day(2023, 12, 31)), Month::December);
        assert_eq!(Month::from_date(day(2024, 2, 29)), Month::February);
        assert_eq!("September".parse::<Month>().unwrap(), Month::September);
        assert!("Sept".parse::<Month>().is_err());
        assert_eq!(Month::November.to_string(), "November");
    }

    #[test]
    fn test_data_point_deserializes_source_columns() {
        let json = r#"[
            {"Company": "Apple", "Date": "2023-11-01", "Open": 100.0, "Close": 105.0},
            {"Company": "Apple", "Date": "2023-11-02T05:00:00.000Z", "Open": 105, "Close": 103}
        ]"#;
        let points: Vec<DataPoint> = serde_json::from_str(json).unwrap();
        assert_eq!(points[0].date, day(2023, 11, 1));
        assert_eq!(points[1].date, day(2023, 11, 2));
        assert_eq!(points[1].open, 105.0);
    }

    #[test]
    fn test_data_point_rejects_bad_date() {
        let json = r#"{"Company": "Apple", "Date": "Nov 1", "Open": 1.0, "Close": 2.0}"#;
        assert!(serde_json::from_str::<DataPoint>(json).is_err());
    }

    #[test]
    fn test_parse_flexible_date() {
        assert_eq!(parse_flexible_date("2023-11-01"), Some(day(2023, 11, 1)));
        assert_eq!(parse_flexible_date("2023-11-01T23:30:00-05:00"), Some(day(2023, 11, 1)));
        assert_eq!(parse_flexible_date("2023-11-01T08:00:00"), Some(day(2023, 11, 1)));
        assert_eq!(parse_flexible_date("not a date"), None);
    }

    #[test]
    fn test_low_high_diff() {
        let point = DataPoint::new("Apple", day(2023, 11, 2), 105.0, 103.0);
        assert_eq!(point.low(), 103.0);
        assert_eq!(point.high(), 105.0);
        assert_eq!(point.diff(), -2.0);
    }

    #[test]
    fn test_chart_config_default() {
        let config = ChartConfig::default();
        assert_eq!((config.width, config.height), (700, 400));
        assert_eq!(config.marker_radius, 3);
        assert_eq!((config.tooltip_offset_x, config.tooltip_offset_y), (10, -10));
    }
}
