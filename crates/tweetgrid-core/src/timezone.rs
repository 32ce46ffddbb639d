use std::sync::OnceLock;

use chrono::{
  DateTime,
  Datelike,
  NaiveDate,
  Offset,
  Timelike,
  Utc
};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::{
  AggregateError,
  Result
};

pub const MINUTES_PER_DAY: u32 = 1440;

/// Wall-clock reading of an instant in a
/// named zone. Weekday counts from
/// Sunday = 0.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize
)]
pub struct LocalInstant {
  pub date:    NaiveDate,
  pub weekday: u32,
  pub hour:    u32,
  pub minute:  u32
}

impl LocalInstant {
  pub fn year(&self) -> i32 {
    self.date.year()
  }

  pub fn month(&self) -> u32 {
    self.date.month()
  }

  pub fn day(&self) -> u32 {
    self.date.day()
  }

  #[must_use]
  pub fn minute_of_day(&self) -> u32 {
    self.hour * 60 + self.minute
  }

  #[must_use]
  pub fn date_label(&self) -> String {
    self
      .date
      .format("%Y-%m-%d")
      .to_string()
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct ZoneEntry {
  pub name:  &'static str,
  pub label: String
}

pub fn parse_zone(
  zone_id: &str
) -> Result<Tz> {
  let trimmed = zone_id.trim();
  if trimmed.is_empty() {
    return Err(
      AggregateError::InvalidTimezone(
        zone_id.to_string()
      )
    );
  }

  trimmed.parse::<Tz>().map_err(|err| {
    tracing::debug!(
      timezone = %trimmed,
      error = %err,
      "failed to parse timezone id"
    );
    AggregateError::InvalidTimezone(
      zone_id.to_string()
    )
  })
}

pub fn localize(
  timestamp: DateTime<Utc>,
  zone_id: &str
) -> Result<LocalInstant> {
  let tz = parse_zone(zone_id)?;
  Ok(localize_in(timestamp, &tz))
}

/// Applies the offset in force at
/// `timestamp`, so DST transitions are
/// honoured.
#[must_use]
pub fn localize_in(
  timestamp: DateTime<Utc>,
  tz: &Tz
) -> LocalInstant {
  let local = timestamp.with_timezone(tz);
  LocalInstant {
    date:    local.date_naive(),
    weekday: local
      .weekday()
      .num_days_from_sunday(),
    hour:    local.hour(),
    minute:  local.minute()
  }
}

#[must_use]
pub fn today_in(tz: &Tz) -> NaiveDate {
  Utc::now()
    .with_timezone(tz)
    .date_naive()
}

/// Every known zone id with its current
/// UTC offset, built once per process.
pub fn zone_catalog()
-> &'static [ZoneEntry] {
  static CATALOG: OnceLock<
    Vec<ZoneEntry>
  > = OnceLock::new();
  CATALOG.get_or_init(
    build_zone_catalog
  )
}

pub fn search_zones(
  filter: Option<&str>
) -> Vec<&'static ZoneEntry> {
  let needle = filter
    .map(|raw| {
      raw.trim().to_ascii_lowercase()
    })
    .unwrap_or_default();

  zone_catalog()
    .iter()
    .filter(|entry| {
      needle.is_empty()
        || entry
          .name
          .to_ascii_lowercase()
          .contains(&needle)
    })
    .collect()
}

fn build_zone_catalog() -> Vec<ZoneEntry>
{
  let now = Utc::now();
  let catalog: Vec<ZoneEntry> =
    chrono_tz::TZ_VARIANTS
      .iter()
      .map(|tz| {
        let offset = now
          .with_timezone(tz)
          .offset()
          .fix();
        ZoneEntry {
          name:  tz.name(),
          label: format!(
            "{} ({offset})",
            tz.name()
          )
        }
      })
      .collect();

  tracing::debug!(
    zones = catalog.len(),
    "built timezone catalog"
  );
  catalog
}
