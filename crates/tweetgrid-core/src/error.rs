use chrono::NaiveDate;
use thiserror::Error;

/// Failures that abort a whole aggregation call.
///
/// Events that fall outside a grid window are not errors; aggregators
/// drop them and report the count instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
  /// The zone id is not in the IANA database bundled with chrono-tz
  #[error("unrecognized timezone identifier `{0}`")]
  InvalidTimezone(String),

  /// Period length must be positive and divide a day (1440 minutes)
  #[error(
    "period of {0} minutes does not \
     evenly divide a day"
  )]
  InvalidPeriod(u32),

  #[error(
    "label stride must be at least 1, \
     got {0}"
  )]
  InvalidLabelStride(usize),

  /// Calendar window would leave the
  /// supported date range
  #[error(
    "reference date {0} is out of range \
     for a one-year window"
  )]
  InvalidReferenceDate(NaiveDate),

  #[error("unrecognized timestamp `{0}`")]
  InvalidTimestamp(String)
}

pub type Result<T> =
  std::result::Result<T, AggregateError>;
