use chrono_tz::Tz;

use crate::event::Event;
use crate::grid::{DAYS_PER_WEEK, Grid};
use crate::timezone::{LocalInstant, localize_in};

/// Counts events into a weekday-by-column grid. The row is the zone-local
/// weekday (Sunday = 0); `column_of` picks the column and may reject an
/// event by returning `None` or an index past `cols`.
///
/// Returns the filled grid and the number of events that were dropped.
pub(crate) fn bucket_by_weekday<F>(
    events: &[Event],
    tz: &Tz,
    cols: usize,
    mut column_of: F,
) -> (Grid, usize)
where
    F: FnMut(&LocalInstant) -> Option<usize>,
{
    let mut grid = Grid::new(DAYS_PER_WEEK, cols);
    let mut dropped = 0usize;

    for event in events {
        let local = localize_in(event.timestamp, tz);
        let placed = column_of(&local)
            .map(|col| grid.increment(local.weekday as usize, col))
            .unwrap_or(false);
        if !placed {
            tracing::trace!(timestamp = %event.timestamp, "event outside grid window");
            dropped += 1;
        }
    }

    (grid, dropped)
}
