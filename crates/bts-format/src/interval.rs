//! Mapping a time window onto an inclusive range of sample indices
//!
//! Sample `i` is taken at `t0 + i * dt`. For a window `[from, upto]` the first
//! index inside is the ceiling of `(from - t0) / dt` and the last index inside
//! is the floor of `(upto - t0) / dt`. When the window falls between two
//! samples the first index exceeds the last; that is an empty result, not an
//! error.

use crate::error::{Result, TimeseriesError};
use crate::timebase::TimeValue;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::ops::Range;

/// Inclusive range of sample indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexInterval {
    /// First sample index inside the window
    pub first: i64,
    /// Last sample index inside the window
    pub last: i64,
}

impl IndexInterval {
    /// Interval that contains no samples
    pub const EMPTY: Self = Self { first: 0, last: -1 };

    /// Create an interval from its inclusive bounds
    pub const fn new(first: i64, last: i64) -> Self {
        Self { first, last }
    }

    /// Whether no sample lies inside
    pub const fn is_empty(&self) -> bool {
        self.first > self.last
    }

    /// Number of samples inside, saturating at `usize::MAX`
    pub fn len(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        usize::try_from(self.last.abs_diff(self.first))
            .map_or(usize::MAX, |span| span.saturating_add(1))
    }

    /// Restrict the interval to the indices of a region holding `count` samples
    pub fn clamp(&self, count: usize) -> Self {
        if count == 0 || self.is_empty() {
            return Self::EMPTY;
        }
        let first = self.first.max(0);
        let last = self.last.min(count as i64 - 1);
        if first > last {
            Self::EMPTY
        } else {
            Self { first, last }
        }
    }

    /// Half-open `usize` range, or `None` when empty or negative
    pub fn as_range(&self) -> Option<Range<usize>> {
        if self.is_empty() || self.first < 0 {
            return None;
        }
        Some(self.first as usize..self.last as usize + 1)
    }
}

/// Resolve a window against an integer timebase
///
/// Uses the truncating ceiling idiom `(from - t0 + dt - 1) / dt`, which is
/// only a ceiling for non-negative offsets, so `from < t0` is rejected.
pub fn integer_interval(t0: i64, dt: i64, from: i64, upto: i64) -> Result<IndexInterval> {
    if dt <= 0 {
        return Err(TimeseriesError::InvalidInterval(format!(
            "dt must be positive, got {dt}"
        )));
    }
    if from > upto {
        return Err(TimeseriesError::InvalidInterval(format!(
            "window start {from} lies after window end {upto}"
        )));
    }
    if from < t0 {
        return Err(TimeseriesError::InvalidInterval(format!(
            "window start {from} lies before t0 {t0}"
        )));
    }

    // Offsets are non-negative and may exceed i64, indices saturate
    let from_offset = i128::from(from) - i128::from(t0);
    let upto_offset = i128::from(upto) - i128::from(t0);
    let dt = i128::from(dt);
    let saturate = |index: i128| i64::try_from(index).unwrap_or(i64::MAX);

    Ok(IndexInterval {
        first: saturate((from_offset + dt - 1) / dt),
        last: saturate(upto_offset / dt),
    })
}

/// Resolve a window against a real timebase
pub fn real_interval(t0: f64, dt: f64, from: f64, upto: f64) -> Result<IndexInterval> {
    if !(dt.is_finite() && dt > 0.0) {
        return Err(TimeseriesError::InvalidInterval(format!(
            "dt must be positive and finite, got {dt}"
        )));
    }
    if t0.is_nan() || from.is_nan() || upto.is_nan() {
        return Err(TimeseriesError::InvalidInterval(
            "NaN in timebase or window".to_string(),
        ));
    }
    if from > upto {
        return Err(TimeseriesError::InvalidInterval(format!(
            "window start {from} lies after window end {upto}"
        )));
    }

    let first = ((from - t0) / dt).ceil() as i64;
    let last = ((upto - t0) / dt).floor() as i64;
    Ok(IndexInterval { first, last })
}

/// Resolve a window against a timebase of either kind
pub fn index_interval<T: TimeValue>(t0: T, dt: T, from: T, upto: T) -> Result<IndexInterval> {
    T::index_interval(t0, dt, from, upto)
}

/// Resolve a window against a region holding `count` samples
///
/// Windows reaching before `t0` or past the last sample are cut to the
/// recorded span first, so only the overlap is returned.
pub fn resolve_window<T: TimeValue>(
    t0: T,
    dt: T,
    from: T,
    upto: T,
    count: usize,
) -> Result<IndexInterval> {
    match from.partial_cmp(&upto) {
        Some(Ordering::Less | Ordering::Equal) => {}
        _ => {
            return Err(TimeseriesError::InvalidInterval(format!(
                "window [{from:?}, {upto:?}] is empty or not comparable"
            )));
        }
    }
    if count == 0 || upto < t0 {
        return Ok(IndexInterval::EMPTY);
    }
    let from = if from < t0 { t0 } else { from };
    Ok(T::index_interval(t0, dt, from, upto)?.clamp(count))
}
