use super::form::empty_as_none;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    Today,
    Week,
    Month,
    Year,
}

impl DateFilter {
    pub const ALL: [DateFilter; 4] = [
        DateFilter::Today,
        DateFilter::Week,
        DateFilter::Month,
        DateFilter::Year,
    ];

    /// Unknown or blank values mean "no filter".
    pub fn parse(value: Option<&str>) -> Option<Self> {
        match value.map(str::trim) {
            Some("today") => Some(DateFilter::Today),
            Some("week") => Some(DateFilter::Week),
            Some("month") => Some(DateFilter::Month),
            Some("year") => Some(DateFilter::Year),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DateFilter::Today => "today",
            DateFilter::Week => "week",
            DateFilter::Month => "month",
            DateFilter::Year => "year",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DateFilter::Today => "Today",
            DateFilter::Week => "Last 7 days",
            DateFilter::Month => "Last 30 days",
            DateFilter::Year => "Last 12 months",
        }
    }

    /// Earliest timestamp included by the filter.
    pub fn since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            DateFilter::Today => now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .map(|midnight| midnight.and_utc())
                .unwrap_or(now),
            DateFilter::Week => now - Duration::days(7),
            DateFilter::Month => now - Duration::days(30),
            DateFilter::Year => now - Duration::days(365),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct ListStudentsParams {
    pub search: Option<String>,
    pub date_filter: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<i64>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ListCertificatesParams {
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub course_id: Option<i64>,
    pub date_filter: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<i64>,
}

#[derive(Deserialize, Debug)]
pub struct IssueCertificateForm {
    pub user_id: i64,
    pub course_id: i64,
}
