//! ISO-week mileage buckets and their text bar chart.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::future::Future;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::bulk::RUN;
use crate::dates::DateRange;
use crate::{AccessToken, Activity, ActivityQuery, StravaClient, StravaConfig, StravaError};

pub const MAX_BAR_WIDTH: usize = 50;
const BAR_CHAR: char = '█';
const RULE_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IsoWeek {
    pub year: i32,
    pub week: u32,
}

impl IsoWeek {
    /// Week 1 is the Monday-started week holding the year's first Thursday.
    pub fn of(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_isoywd_opt(self.year, self.week, Weekday::Mon)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyBucket {
    pub iso_week: IsoWeek,
    pub week_start: NaiveDate,
    pub total_miles: f64,
    pub activity_count: usize,
}

/// Buckets activities by the ISO week of their local start date, oldest week first.
pub fn group_by_week(activities: &[Activity]) -> Vec<WeeklyBucket> {
    let mut buckets: BTreeMap<NaiveDate, WeeklyBucket> = BTreeMap::new();

    for activity in activities {
        let date = activity.local_date();
        let iso_week = IsoWeek::of(date);
        // The Monday of a date's own week always exists.
        let week_start = iso_week.start_date().unwrap_or(date);

        let bucket = buckets.entry(week_start).or_insert_with(|| WeeklyBucket {
            iso_week,
            week_start,
            total_miles: 0.0,
            activity_count: 0,
        });
        bucket.total_miles += activity.distance_miles();
        bucket.activity_count += 1;
    }

    buckets.into_values().collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeeklySummary {
    pub total: f64,
    pub average: f64,
    pub max: f64,
    pub weeks: usize,
}

impl WeeklySummary {
    pub fn from_buckets(buckets: &[WeeklyBucket]) -> Option<Self> {
        if buckets.is_empty() {
            return None;
        }
        let total: f64 = buckets.iter().map(|bucket| bucket.total_miles).sum();
        let max = buckets
            .iter()
            .map(|bucket| bucket.total_miles)
            .fold(0.0, f64::max);
        Some(Self {
            total,
            average: total / buckets.len() as f64,
            max,
            weeks: buckets.len(),
        })
    }
}

/// Bar length for `miles` when `max` maps to [`MAX_BAR_WIDTH`].
pub fn bar_length(miles: f64, max: f64) -> usize {
    let scale = if max > 0.0 {
        MAX_BAR_WIDTH as f64 / max
    } else {
        1.0
    };
    (miles * scale).round() as usize
}

pub fn render(buckets: &[WeeklyBucket]) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "\n{rule}");
    let _ = writeln!(out, "WEEKLY RUNNING MILEAGE - PAST YEAR");
    let _ = writeln!(out, "{rule}\n");

    let Some(summary) = WeeklySummary::from_buckets(buckets) else {
        let _ = writeln!(out, "No running activities found in the past year.");
        return out;
    };

    for bucket in buckets {
        let width = bar_length(bucket.total_miles, summary.max);
        let bar: String = std::iter::repeat_n(BAR_CHAR, width).collect();
        let _ = writeln!(
            out,
            "{}  {} {:.1} mi ({} runs)",
            bucket.week_start.format("%Y-%m-%d"),
            bar,
            bucket.total_miles,
            bucket.activity_count
        );
    }

    let _ = writeln!(out, "\n{rule}");
    let _ = writeln!(out, "SUMMARY STATISTICS");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Total Miles:   {:.1} mi", summary.total);
    let _ = writeln!(out, "Average/Week:  {:.1} mi", summary.average);
    let _ = writeln!(out, "Max Week:      {:.1} mi", summary.max);
    let _ = writeln!(out, "Total Weeks:   {}", summary.weeks);
    let _ = writeln!(out, "{rule}");
    out
}

/// Fetches the runs of the twelve months up to `today` and renders their chart.
pub async fn run<A, Fut>(
    config: &StravaConfig,
    today: NaiveDate,
    authorize: A,
) -> Result<String, StravaError>
where
    A: FnOnce() -> Fut,
    Fut: Future<Output = Result<AccessToken, StravaError>>,
{
    let token = authorize().await?;
    let client = StravaClient::new(config, token)?;

    println!("\nFetching running activities from the past year...");
    let (after, before) = DateRange::past_year(today).epoch_window();
    let query = ActivityQuery::window(after, before).of_type(RUN);
    let activities = client.fetch_activities(&query).await?;
    println!("Found {} running activities in the past year.", activities.len());

    Ok(render(&group_by_week(&activities)))
}
