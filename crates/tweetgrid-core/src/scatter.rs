use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::event::Event;
use crate::timezone::{localize_in, parse_zone};

/// Minute-of-day ticks for the vertical axis of the scatter plot.
pub const MINUTE_TICKS: [(u32, &str); 5] = [
    (0, "00:00"),
    (6 * 60, "06:00"),
    (12 * 60, "12:00"),
    (18 * 60, "18:00"),
    (24 * 60 - 1, "23:59"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScatterPoint {
    pub date_label: String,
    pub minute_of_day: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AxisTick {
    pub value: u32,
    pub label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScatterProjection {
    pub zone: String,
    pub points: Vec<ScatterPoint>,
    pub minute_ticks: Vec<AxisTick>,
}

/// Maps events onto (local date, minute of day) coordinates, one point per
/// event, in input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeOfDayProjector;

impl TimeOfDayProjector {
    pub fn new() -> Self {
        Self
    }

    #[tracing::instrument(skip(self, events), fields(events = events.len()))]
    pub fn project(&self, events: &[Event], zone_id: &str) -> Result<ScatterProjection> {
        let tz = parse_zone(zone_id)?;

        let points: Vec<ScatterPoint> = events
            .iter()
            .map(|event| {
                let local = localize_in(event.timestamp, &tz);
                ScatterPoint {
                    date_label: local.date_label(),
                    minute_of_day: local.minute_of_day(),
                }
            })
            .collect();

        debug!(points = points.len(), zone = %tz.name(), "projected events");

        Ok(ScatterProjection {
            zone: tz.name().to_string(),
            points,
            minute_ticks: MINUTE_TICKS
                .iter()
                .map(|&(value, label)| AxisTick { value, label })
                .collect(),
        })
    }
}
