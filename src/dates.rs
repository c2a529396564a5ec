use chrono::{DateTime, Days, Months, NaiveDate, NaiveTime, Utc};

use crate::{Prompt, StravaError};

/// Accepted input layouts; the first is the one users are asked for.
const DATE_FORMATS: &[&str] = &["%Y/%m/%d", "%Y-%m-%d"];

pub fn parse_date(input: &str) -> Result<NaiveDate, StravaError> {
    let trimmed = input.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| StravaError::InvalidDateFormat(trimmed.to_string()))
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, StravaError> {
        if start > end {
            return Err(StravaError::DateRangeInverted {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// The twelve months up to and including `today`.
    pub fn past_year(today: NaiveDate) -> Self {
        let start = today.checked_sub_months(Months::new(12)).unwrap_or(today);
        Self { start, end: today }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// `after` is the start day at midnight UTC; `before` is midnight after the end day.
    pub fn epoch_window(&self) -> (i64, i64) {
        let after = midnight_utc(self.start).timestamp();
        let before = self
            .end
            .checked_add_days(Days::new(1))
            .map(midnight_utc)
            .map_or(i64::MAX, |end| end.timestamp());
        (after, before)
    }
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

pub fn prompt_date<P>(prompt: &mut P, question: &str) -> Result<NaiveDate, StravaError>
where
    P: Prompt + ?Sized,
{
    let answer = prompt.ask(question)?;
    parse_date(&answer)
}

/// Asks for a start and end date and validates their order.
pub fn prompt_date_range<P: Prompt + ?Sized>(prompt: &mut P) -> Result<DateRange, StravaError> {
    println!("\nPlease provide the date range for filtering activities.");
    let start = prompt_date(prompt, "Start Date (YYYY/MM/DD): ")?;
    let end = prompt_date(prompt, "End Date (YYYY/MM/DD): ")?;
    let range = DateRange::new(start, end)?;

    println!(
        "\nDate Range Received:\nStart Date: {}\nEnd Date: {}",
        range.start(),
        range.end()
    );
    Ok(range)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::LinePrompt;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_slash_and_dash_dates() {
        assert_eq!(parse_date("2024/03/05").unwrap(), date(2024, 3, 5));
        assert_eq!(parse_date(" 2024-03-05 ").unwrap(), date(2024, 3, 5));
    }

    #[test]
    fn rejects_garbage_and_impossible_dates() {
        for input in ["", "yesterday", "2024/02/30", "03/05/2024"] {
            assert!(
                matches!(parse_date(input), Err(StravaError::InvalidDateFormat(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn inverted_range_is_rejected() {
        let result = DateRange::new(date(2024, 5, 2), date(2024, 5, 1));
        assert!(matches!(result, Err(StravaError::DateRangeInverted { .. })));
    }

    #[test]
    fn single_day_range_is_allowed() {
        let range = DateRange::new(date(2024, 5, 1), date(2024, 5, 1)).unwrap();
        let (after, before) = range.epoch_window();
        assert_eq!(before - after, 86_400);
    }

    #[test]
    fn epoch_window_covers_end_day() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert_eq!(range.epoch_window(), (1_704_067_200, 1_706_745_600));
    }

    #[test]
    fn past_year_spans_twelve_months() {
        let range = DateRange::past_year(date(2024, 2, 29));
        assert_eq!(range.start(), date(2023, 2, 28));
        assert_eq!(range.end(), date(2024, 2, 29));
    }

    #[test]
    fn prompted_range_fails_when_start_after_end() {
        let mut prompt = LinePrompt::new(Cursor::new("2024/06/10\n2024/06/01\n"), Vec::new());
        let result = prompt_date_range(&mut prompt);
        assert!(matches!(result, Err(StravaError::DateRangeInverted { .. })));
    }

    #[test]
    fn prompted_range_stops_at_first_bad_date() {
        let mut prompt = LinePrompt::new(Cursor::new("June 1st\n2024/06/01\n"), Vec::new());
        let result = prompt_date_range(&mut prompt);
        assert!(matches!(result, Err(StravaError::InvalidDateFormat(_))));
        let asked = String::from_utf8(prompt.into_output()).unwrap();
        assert!(!asked.contains("End Date"));
    }
}
