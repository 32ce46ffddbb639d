pub mod archive;
mod bucket;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod error;
pub mod event;
pub mod grid;
pub mod hourly;
pub mod render;
pub mod scatter;
pub mod timezone;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

pub use calendar::{
  CalendarHeatmap,
  CalendarWindow,
  CalendarYearAggregator
};
pub use error::AggregateError;
pub use event::Event;
pub use grid::Grid;
pub use hourly::{
  HourOfDayAggregator,
  HourlyHeatmap
};
pub use scatter::{
  ScatterProjection,
  TimeOfDayProjector
};
pub use timezone::{
  LocalInstant,
  localize
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting tweetgrid"
  );

  let mut cfg = config::Config::load(
    cli.config.as_deref()
  )?;
  debug!(
    files = ?cfg.loaded_files,
    "loaded config files"
  );
  cfg.apply_overrides(
    cli
      .rc_overrides
      .into_iter()
      .map(|kv| (kv.key, kv.value))
  );

  let zone = cfg.resolve_timezone(
    cli.timezone.as_deref()
  );
  debug!(zone = %zone, "resolved timezone");

  let mut renderer =
    render::Renderer::new(
      &cfg, cli.format
    )?;

  match cli.command {
    | cli::Command::Scatter {
      archive: path
    } => {
      let events =
        archive::load_archive(&path)?;
      let projection =
        TimeOfDayProjector::new()
          .project(&events, &zone)
          .context(
            "scatter projection failed"
          )?;
      renderer.print_scatter(&projection)?;
    }
    | cli::Command::Calendar {
      archive: path,
      reference_date
    } => {
      let events =
        archive::load_archive(&path)?;
      let mut builder =
        CalendarYearAggregator::builder(
        );
      if let Some(date) = reference_date
      {
        builder =
          builder.reference_date(date);
      }
      let heatmap = builder
        .build()
        .aggregate(&events, &zone)
        .context(
          "calendar aggregation failed"
        )?;
      renderer.print_calendar(&heatmap)?;
    }
    | cli::Command::Hourly {
      archive: path,
      period_minutes,
      label_stride
    } => {
      let period = match period_minutes {
        | Some(value) => value,
        | None => cfg.period_minutes()?
      };
      let stride = match label_stride {
        | Some(value) => value,
        | None => cfg.label_stride()?
      };
      let aggregator =
        HourOfDayAggregator::builder()
          .period_minutes(period)
          .label_stride(stride)
          .build()?;
      let events =
        archive::load_archive(&path)?;
      let heatmap = aggregator
        .aggregate(&events, &zone)
        .context(
          "hourly aggregation failed"
        )?;
      renderer.print_hourly(&heatmap)?;
    }
    | cli::Command::Zones {
      filter
    } => {
      let zones = timezone::search_zones(
        filter.as_deref()
      );
      renderer.print_zones(&zones)?;
    }
  }

  info!("done");
  Ok(())
}
