use std::io::Write;

use chrono::NaiveDate;
use tweetgrid_core::archive::load_archive;
use tweetgrid_core::{
    AggregateError, CalendarYearAggregator, HourOfDayAggregator, TimeOfDayProjector, localize,
};

const ARCHIVE: &str = r#"window.YTD.tweets.part0 = [
  { "tweet": { "id_str": "1", "created_at": "Sat Dec 31 23:30:00 +0000 2022" } },
  { "tweet": { "id_str": "2", "created_at": "Sun Jan 08 10:00:00 +0000 2023" } },
  { "tweet": { "id_str": "3", "created_at": "Wed Feb 15 18:45:00 +0000 2023" } },
  { "tweet": { "id_str": "4", "created_at": "Mon Jul 03 04:05:00 +0000 2023" } },
  { "tweet": { "id_str": "5", "created_at": "Sun Dec 31 23:59:00 +0000 2023" } },
  { "tweet": { "id_str": "6", "created_at": "Sat Jan 06 13:00:00 +0000 2024" } }
]"#;

fn reference() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 6).expect("valid date")
}

#[test]
fn archive_feeds_all_three_aggregators() {
    let mut file = tempfile::NamedTempFile::new().expect("temp archive");
    file.write_all(ARCHIVE.as_bytes()).expect("write archive");

    let events = load_archive(file.path()).expect("load archive");
    assert_eq!(events.len(), 6);

    let scatter = TimeOfDayProjector::new()
        .project(&events, "UTC")
        .expect("project");
    assert_eq!(scatter.points.len(), events.len());
    for (point, event) in scatter.points.iter().zip(&events) {
        let local = localize(event.timestamp, "UTC").expect("localize");
        assert_eq!(point.date_label, local.date_label());
    }
    assert_eq!(scatter.points[3].minute_of_day, 4 * 60 + 5);

    let hourly = HourOfDayAggregator::default()
        .aggregate(&events, "UTC")
        .expect("hourly");
    assert_eq!(hourly.grid.total(), events.len() as u64);
    assert_eq!(hourly.grid.get(3, 18), Some(1));

    let calendar = CalendarYearAggregator::builder()
        .reference_date(reference())
        .build()
        .aggregate(&events, "UTC")
        .expect("calendar");
    assert_eq!(calendar.window.weeks, 52);
    // the 2022 event predates the first data column
    assert_eq!(calendar.grid.total(), 5);
    assert_eq!(calendar.dropped, 1);
    assert_eq!(calendar.grid.get(0, 51), Some(1));
    assert_eq!(calendar.grid.get(6, 51), Some(1));
}

#[test]
fn zone_change_reshuffles_days() {
    let events = tweetgrid_core::archive::parse_archive(ARCHIVE).expect("parse archive");
    let calendar = CalendarYearAggregator::builder()
        .reference_date(reference())
        .build();

    // UTC+9 moves New Year's Eve 2023 onto Monday Jan 1 in the same week
    // column, and the 2022 event onto Sunday Jan 1, still before the first
    // column.
    let utc = calendar.aggregate(&events, "UTC").expect("utc");
    let tokyo = calendar.aggregate(&events, "Asia/Tokyo").expect("tokyo");
    assert_eq!(tokyo.grid.total(), 5);
    assert_eq!(tokyo.dropped, 1);
    assert_eq!(utc.grid.get(0, 51), Some(1));
    assert_eq!(tokyo.grid.get(0, 51), Some(0));
    assert_eq!(tokyo.grid.get(1, 51), Some(1));

    let hourly = HourOfDayAggregator::default()
        .aggregate(&events, "Asia/Tokyo")
        .expect("hourly");
    assert_eq!(hourly.grid.total(), events.len() as u64);
    assert_eq!(hourly.grid.get(0, 8), Some(1));
}

#[test]
fn fatal_errors_surface_to_the_caller() {
    let events = tweetgrid_core::archive::parse_archive(ARCHIVE).expect("parse archive");

    assert_eq!(
        HourOfDayAggregator::builder().period_minutes(50).build().expect_err("period"),
        AggregateError::InvalidPeriod(50)
    );
    assert!(matches!(
        HourOfDayAggregator::default().aggregate(&events, "Not/AZone"),
        Err(AggregateError::InvalidTimezone(_))
    ));
}
