use serde::Serialize;
use tracing::debug;

use crate::bucket::bucket_by_weekday;
use crate::error::{AggregateError, Result};
use crate::event::Event;
use crate::grid::{Grid, WEEKDAY_SHORT};
use crate::timezone::{MINUTES_PER_DAY, parse_zone};

pub const DEFAULT_PERIOD_MINUTES: u32 = 60;
pub const DEFAULT_LABEL_STRIDE: usize = 6;

#[derive(Debug, Clone, Serialize)]
pub struct HourlyHeatmap {
    pub zone: String,
    pub period_minutes: u32,
    pub grid: Grid,
    pub row_labels: Vec<String>,
    pub column_labels: Vec<String>,
    pub max: u32,
}

#[derive(Debug, Clone)]
pub struct HourOfDayAggregatorBuilder {
    period_minutes: u32,
    label_stride: usize,
}

impl Default for HourOfDayAggregatorBuilder {
    fn default() -> Self {
        Self {
            period_minutes: DEFAULT_PERIOD_MINUTES,
            label_stride: DEFAULT_LABEL_STRIDE,
        }
    }
}

impl HourOfDayAggregatorBuilder {
    pub fn period_minutes(mut self, minutes: u32) -> Self {
        self.period_minutes = minutes;
        self
    }

    /// Only every `stride`-th period gets a label.
    pub fn label_stride(mut self, stride: usize) -> Self {
        self.label_stride = stride;
        self
    }

    pub fn build(self) -> Result<HourOfDayAggregator> {
        if self.period_minutes == 0 || MINUTES_PER_DAY % self.period_minutes != 0 {
            return Err(AggregateError::InvalidPeriod(self.period_minutes));
        }
        if self.label_stride == 0 {
            return Err(AggregateError::InvalidLabelStride(self.label_stride));
        }
        Ok(HourOfDayAggregator {
            period_minutes: self.period_minutes,
            label_stride: self.label_stride,
        })
    }
}

/// Weekday by time-of-day activity heatmap.
#[derive(Debug, Clone)]
pub struct HourOfDayAggregator {
    period_minutes: u32,
    label_stride: usize,
}

impl Default for HourOfDayAggregator {
    fn default() -> Self {
        Self {
            period_minutes: DEFAULT_PERIOD_MINUTES,
            label_stride: DEFAULT_LABEL_STRIDE,
        }
    }
}

impl HourOfDayAggregator {
    pub fn builder() -> HourOfDayAggregatorBuilder {
        HourOfDayAggregatorBuilder::default()
    }

    pub fn period_count(&self) -> usize {
        (MINUTES_PER_DAY / self.period_minutes) as usize
    }

    #[tracing::instrument(skip(self, events), fields(events = events.len(), period = self.period_minutes))]
    pub fn aggregate(&self, events: &[Event], zone_id: &str) -> Result<HourlyHeatmap> {
        let tz = parse_zone(zone_id)?;
        let periods = self.period_count();

        let (grid, dropped) = bucket_by_weekday(events, &tz, periods, |local| {
            Some((local.minute_of_day() / self.period_minutes) as usize)
        });
        // every minute of the day maps to a period
        debug_assert_eq!(dropped, 0);

        debug!(periods, total = grid.total(), "bucketed events by period");

        Ok(HourlyHeatmap {
            zone: tz.name().to_string(),
            period_minutes: self.period_minutes,
            row_labels: WEEKDAY_SHORT.iter().map(|s| s.to_string()).collect(),
            column_labels: self.period_labels(),
            max: grid.max(),
            grid,
        })
    }

    pub fn period_labels(&self) -> Vec<String> {
        (0..self.period_count())
            .map(|idx| {
                if idx % self.label_stride == 0 {
                    clock_label(idx as u32 * self.period_minutes)
                } else {
                    String::new()
                }
            })
            .collect()
    }
}

/// Twelve-hour label for a minute of the day. Midnight reads `0:00 AM`.
fn clock_label(start_minute: u32) -> String {
    let mut hour = start_minute / 60;
    let minute = start_minute % 60;
    let suffix = if hour >= 12 { "PM" } else { "AM" };
    if hour > 12 {
        hour -= 12;
    }
    format!("{hour}:{minute:02} {suffix}")
}
