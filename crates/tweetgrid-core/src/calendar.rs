use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::bucket::bucket_by_weekday;
use crate::error::{AggregateError, Result};
use crate::event::Event;
use crate::grid::{DAYS_PER_WEEK, Grid, WEEKDAY_SPARSE};
use crate::timezone::{parse_zone, today_in};

/// Trailing one-year span of whole Sunday..Saturday weeks ending on the
/// Saturday that closes the reference date's week.
///
/// `window_start` is the Sunday of the week holding the same calendar day
/// one year earlier. That week only anchors the window: data columns begin
/// with the following Sunday (`first_column`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarWindow {
    pub window_start: NaiveDate,
    pub first_column: NaiveDate,
    pub last_day: NaiveDate,
    pub weeks: usize,
}

impl CalendarWindow {
    /// Fails when the window would step outside the representable date
    /// range.
    pub fn ending_at(reference: NaiveDate) -> Result<Self> {
        let out_of_range = || AggregateError::InvalidReferenceDate(reference);

        let last_day = shift_days(reference, 6 - days_from_sunday(reference))
            .ok_or_else(out_of_range)?;
        let one_year_ago = same_day_previous_year(last_day).ok_or_else(out_of_range)?;
        let window_start = shift_days(one_year_ago, -days_from_sunday(one_year_ago))
            .ok_or_else(out_of_range)?;
        let prior_saturday = shift_days(one_year_ago, 6 - days_from_sunday(one_year_ago))
            .ok_or_else(out_of_range)?;
        let first_column = shift_days(prior_saturday, 1).ok_or_else(out_of_range)?;
        let weeks = (last_day - prior_saturday).num_days().div_euclid(7).max(0) as usize;

        debug!(
            %reference,
            %window_start,
            %last_day,
            weeks,
            "computed calendar window"
        );

        Ok(Self {
            window_start,
            first_column,
            last_day,
            weeks,
        })
    }

    /// Week column holding `date`, or `None` outside the window.
    pub fn column_of(&self, date: NaiveDate) -> Option<usize> {
        let offset = (date - self.first_column).num_days();
        if offset < 0 {
            return None;
        }
        let col = (offset / 7) as usize;
        (col < self.weeks).then_some(col)
    }

    pub fn date_at(&self, row: usize, col: usize) -> Option<NaiveDate> {
        let offset = i64::try_from(col * DAYS_PER_WEEK + row).ok()?;
        shift_days(self.first_column, offset)
    }

    /// Saturday closing the given week column.
    pub fn column_end(&self, col: usize) -> Option<NaiveDate> {
        self.date_at(DAYS_PER_WEEK - 1, col)
    }

    /// Every day covered by the data columns, Sunday of column 0 first.
    pub fn days(&self) -> Vec<NaiveDate> {
        self.first_column
            .iter_days()
            .take(self.weeks * DAYS_PER_WEEK)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarHeatmap {
    pub zone: String,
    pub window: CalendarWindow,
    pub grid: Grid,
    pub cell_labels: Vec<Vec<String>>,
    pub column_labels: Vec<String>,
    pub row_labels: Vec<String>,
    pub dropped: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CalendarYearAggregatorBuilder {
    reference_date: Option<NaiveDate>,
}

impl CalendarYearAggregatorBuilder {
    /// Pins the date whose week closes the window. Without it the
    /// zone-local current date is used at aggregation time.
    pub fn reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn build(self) -> CalendarYearAggregator {
        CalendarYearAggregator {
            reference_date: self.reference_date,
        }
    }
}

/// Yearly contribution-style heatmap: weekday rows by week columns.
#[derive(Debug, Clone, Default)]
pub struct CalendarYearAggregator {
    reference_date: Option<NaiveDate>,
}

impl CalendarYearAggregator {
    pub fn builder() -> CalendarYearAggregatorBuilder {
        CalendarYearAggregatorBuilder::default()
    }

    #[tracing::instrument(skip(self, events), fields(events = events.len()))]
    pub fn aggregate(&self, events: &[Event], zone_id: &str) -> Result<CalendarHeatmap> {
        let tz = parse_zone(zone_id)?;
        let reference = self.reference_date.unwrap_or_else(|| today_in(&tz));
        let window = CalendarWindow::ending_at(reference)?;
        let days = window.days();

        let (grid, dropped) =
            bucket_by_weekday(events, &tz, window.weeks, |local| window.column_of(local.date));

        if dropped > 0 {
            debug!(dropped, "events outside the calendar window were skipped");
        }

        Ok(CalendarHeatmap {
            zone: tz.name().to_string(),
            cell_labels: cell_labels(&grid, &days),
            column_labels: month_labels(&days),
            row_labels: WEEKDAY_SPARSE.iter().map(|s| s.to_string()).collect(),
            window,
            grid,
            dropped,
        })
    }
}

fn cell_labels(grid: &Grid, days: &[NaiveDate]) -> Vec<Vec<String>> {
    grid.iter_rows()
        .enumerate()
        .map(|(row, counts)| {
            counts
                .iter()
                .zip(days.chunks_exact(DAYS_PER_WEEK))
                .map(|(&count, week)| {
                    let noun = if count == 1 {
                        "contribution"
                    } else {
                        "contributions"
                    };
                    format!("{count} {noun} on {}", week[row].format("%B %-d"))
                })
                .collect()
        })
        .collect()
}

fn month_labels(days: &[NaiveDate]) -> Vec<String> {
    let mut seen: HashSet<(i32, u32)> = HashSet::new();
    days.chunks_exact(DAYS_PER_WEEK)
        .map(|week| {
            let date = week[DAYS_PER_WEEK - 1];
            if seen.insert((date.year(), date.month())) {
                date.format("%b").to_string()
            } else {
                String::new()
            }
        })
        .collect()
}

fn days_from_sunday(date: NaiveDate) -> i64 {
    i64::from(date.weekday().num_days_from_sunday())
}

fn shift_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
}

fn same_day_previous_year(date: NaiveDate) -> Option<NaiveDate> {
    let year = date.year().checked_sub(1)?;
    // Feb 29 overflows into Mar 1
    date.with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, NaiveDate, Weekday};
    use chrono_tz::Tz;

    use super::{CalendarWindow, CalendarYearAggregator};
    use crate::error::AggregateError;
    use crate::event::Event;
    use crate::timezone::today_in;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn events(raw: &[&str]) -> Vec<Event> {
        raw.iter()
            .map(|value| Event::parse(value).expect("valid timestamp"))
            .collect()
    }

    #[test]
    fn window_for_saturday_reference() {
        let window = CalendarWindow::ending_at(date(2024, 1, 6)).expect("window");
        assert_eq!(window.last_day, date(2024, 1, 6));
        assert_eq!(window.window_start, date(2023, 1, 1));
        assert_eq!(window.first_column, date(2023, 1, 8));
        assert_eq!(window.weeks, 52);
        assert_eq!(window.column_end(51), Some(window.last_day));
        assert_eq!(window.days().len(), 52 * 7);
    }

    #[test]
    fn midweek_reference_advances_to_saturday() {
        let window = CalendarWindow::ending_at(date(2023, 12, 31)).expect("window");
        assert_eq!(
            window,
            CalendarWindow::ending_at(date(2024, 1, 6)).expect("window")
        );
    }

    #[test]
    fn leap_day_rolls_into_march() {
        let window = CalendarWindow::ending_at(date(2020, 2, 26)).expect("window");
        assert_eq!(window.last_day, date(2020, 2, 29));
        assert_eq!(window.window_start, date(2019, 2, 24));
        assert_eq!(window.first_column, date(2019, 3, 3));
        assert_eq!(window.weeks, 52);
    }

    #[test]
    fn column_lookup_respects_bounds() {
        let window = CalendarWindow::ending_at(date(2024, 1, 6)).expect("window");
        assert_eq!(window.column_of(date(2023, 1, 7)), None);
        assert_eq!(window.column_of(date(2023, 1, 8)), Some(0));
        assert_eq!(window.column_of(date(2023, 1, 14)), Some(0));
        assert_eq!(window.column_of(date(2023, 1, 15)), Some(1));
        assert_eq!(window.column_of(date(2024, 1, 6)), Some(51));
        assert_eq!(window.column_of(date(2024, 1, 7)), None);
    }

    #[test]
    fn counts_events_inside_window_only() {
        let input = events(&[
            "2023-01-07T12:00:00Z",
            "2023-01-08T12:00:00Z",
            "2024-01-06T08:00:00Z",
            "2024-01-06T09:00:00Z",
            "2024-01-07T00:30:00Z",
        ]);
        let heatmap = CalendarYearAggregator::builder()
            .reference_date(date(2024, 1, 6))
            .build()
            .aggregate(&input, "UTC")
            .expect("aggregate");

        assert_eq!(heatmap.grid.rows(), 7);
        assert_eq!(heatmap.grid.cols(), 52);
        assert_eq!(heatmap.grid.total(), 3);
        assert_eq!(heatmap.dropped, 2);
        assert_eq!(heatmap.grid.get(0, 0), Some(1));
        assert_eq!(heatmap.grid.get(6, 51), Some(2));
        assert_eq!(heatmap.cell_labels[0][0], "1 contribution on January 8");
        assert_eq!(heatmap.cell_labels[6][51], "2 contributions on January 6");
        assert_eq!(heatmap.cell_labels[1][0], "0 contributions on January 9");
    }

    #[test]
    fn month_labels_are_sparse() {
        let heatmap = CalendarYearAggregator::builder()
            .reference_date(date(2024, 1, 6))
            .build()
            .aggregate(&[], "UTC")
            .expect("aggregate");

        let labels = &heatmap.column_labels;
        assert_eq!(labels.len(), 52);
        assert_eq!(labels.iter().filter(|l| !l.is_empty()).count(), 13);
        assert_eq!(labels[0], "Jan");
        assert_eq!(labels[1], "");
        assert_eq!(labels[3], "Feb");
        assert_eq!(labels[7], "Mar");
        assert_eq!(labels[46], "Dec");
        assert_eq!(labels[51], "Jan");
        assert_eq!(heatmap.row_labels[1], "Mon");
        assert_eq!(heatmap.row_labels[0], "");
    }

    #[test]
    fn zone_shift_pulls_event_into_window() {
        let input = events(&["2023-01-07T23:30:00Z"]);
        let aggregator = CalendarYearAggregator::builder()
            .reference_date(date(2024, 1, 6))
            .build();

        let utc = aggregator.aggregate(&input, "UTC").expect("utc");
        let tokyo = aggregator.aggregate(&input, "Asia/Tokyo").expect("tokyo");

        assert_eq!(utc.grid.total(), 0);
        assert_eq!(tokyo.grid.get(0, 0), Some(1));
    }

    #[test]
    fn invalid_zone_fails() {
        assert!(
            CalendarYearAggregator::default()
                .aggregate(&[], "Not/AZone")
                .is_err()
        );
    }

    #[test]
    fn extreme_reference_dates_are_rejected() {
        for reference in [NaiveDate::MAX, NaiveDate::MIN] {
            assert_eq!(
                CalendarWindow::ending_at(reference),
                Err(AggregateError::InvalidReferenceDate(reference))
            );

            let err = CalendarYearAggregator::builder()
                .reference_date(reference)
                .build()
                .aggregate(&events(&["2024-01-06T12:00:00Z"]), "UTC")
                .expect_err("out of range");
            assert_eq!(err, AggregateError::InvalidReferenceDate(reference));
        }
    }

    #[test]
    fn default_reference_is_today_in_zone() {
        fn closing_saturday(day: NaiveDate) -> NaiveDate {
            day.iter_days()
                .find(|d| d.weekday() == Weekday::Sat)
                .expect("saturday ahead")
        }

        let tz: Tz = "Pacific/Auckland".parse().expect("zone");
        let before = today_in(&tz);
        let heatmap = CalendarYearAggregator::default()
            .aggregate(&[], "Pacific/Auckland")
            .expect("aggregate");
        let after = today_in(&tz);

        let last_day = heatmap.window.last_day;
        assert_eq!(last_day.weekday(), Weekday::Sat);
        assert!(last_day == closing_saturday(before) || last_day == closing_saturday(after));
        assert_eq!(heatmap.window.weeks, 52);
        assert_eq!(heatmap.zone, "Pacific/Auckland");
    }
}
