//! Timebase block: dtype tag followed by `t0` and `dt`
//!
//! Timestamps are either `long` (tag 4) or `double` (tag 6). Both kinds are
//! 8 bytes wide, so the block always spans 17 bytes.

use crate::dtype::{DataType, Sample, read_dtype, write_dtype};
use crate::error::{Result, TimeseriesError};
use crate::interval::{IndexInterval, integer_interval, real_interval};
use crate::region::Region;
use serde::{Deserialize, Serialize};
use std::io::{Read, Seek, Write};

/// Encoded size of the timebase block
pub const TIMEBASE_SIZE: u64 = 17;

/// Representation of the timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeKind {
    /// Integer timestamps (`i64`)
    Long,
    /// Floating-point timestamps (`f64`)
    Double,
}

impl TimeKind {
    /// Registered type used on the wire
    pub const fn dtype(self) -> DataType {
        match self {
            Self::Long => DataType::Long,
            Self::Double => DataType::Double,
        }
    }

    /// Kind for a registered type, if it can describe time
    pub const fn from_dtype(dtype: DataType) -> Option<Self> {
        match dtype {
            DataType::Long => Some(Self::Long),
            DataType::Double => Some(Self::Double),
            _ => None,
        }
    }
}

/// Sample type that can also carry timestamps
pub trait TimeValue: Sample + PartialOrd {
    /// Timestamp representation of this type
    const KIND: TimeKind;

    /// Timestamp of sample `index`
    fn time_at(t0: Self, dt: Self, index: usize) -> Self;

    /// Inclusive index range of the samples inside `[from, upto]`
    fn index_interval(t0: Self, dt: Self, from: Self, upto: Self) -> Result<IndexInterval>;

    /// Dynamic timebase for this pair
    fn into_timebase(t0: Self, dt: Self) -> Timebase;

    /// Whether `dt` can serve as a sample interval
    fn is_valid_step(dt: Self) -> bool;
}

impl TimeValue for i64 {
    const KIND: TimeKind = TimeKind::Long;

    /// Wraps on overflow
    fn time_at(t0: Self, dt: Self, index: usize) -> Self {
        t0.wrapping_add((index as Self).wrapping_mul(dt))
    }

    fn index_interval(t0: Self, dt: Self, from: Self, upto: Self) -> Result<IndexInterval> {
        integer_interval(t0, dt, from, upto)
    }

    fn into_timebase(t0: Self, dt: Self) -> Timebase {
        Timebase::Long { t0, dt }
    }

    fn is_valid_step(dt: Self) -> bool {
        dt != 0
    }
}

impl TimeValue for f64 {
    const KIND: TimeKind = TimeKind::Double;

    fn time_at(t0: Self, dt: Self, index: usize) -> Self {
        t0 + index as Self * dt
    }

    fn index_interval(t0: Self, dt: Self, from: Self, upto: Self) -> Result<IndexInterval> {
        real_interval(t0, dt, from, upto)
    }

    fn into_timebase(t0: Self, dt: Self) -> Timebase {
        Timebase::Double { t0, dt }
    }

    fn is_valid_step(dt: Self) -> bool {
        dt != 0.0 && dt.is_finite()
    }
}

/// Reference time and sample interval of a region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Timebase {
    /// Integer timestamps
    Long {
        /// Reference timestamp of sample 0
        t0: i64,
        /// Sample interval
        dt: i64,
    },
    /// Floating-point timestamps
    Double {
        /// Reference timestamp of sample 0
        t0: f64,
        /// Sample interval
        dt: f64,
    },
}

impl Timebase {
    /// Create a timebase from a typed pair
    pub fn new<T: TimeValue>(t0: T, dt: T) -> Self {
        T::into_timebase(t0, dt)
    }

    /// Timestamp representation
    pub const fn kind(&self) -> TimeKind {
        match self {
            Self::Long { .. } => TimeKind::Long,
            Self::Double { .. } => TimeKind::Double,
        }
    }

    /// Registered type used on the wire
    pub const fn dtype(&self) -> DataType {
        self.kind().dtype()
    }

    /// Reference timestamp widened to `f64`
    pub fn t0(&self) -> f64 {
        match *self {
            Self::Long { t0, .. } => t0 as f64,
            Self::Double { t0, .. } => t0,
        }
    }

    /// Sample interval widened to `f64`
    pub fn dt(&self) -> f64 {
        match *self {
            Self::Long { dt, .. } => dt as f64,
            Self::Double { dt, .. } => dt,
        }
    }

    /// Timestamp of sample `index`
    pub fn time_at(&self, index: usize) -> f64 {
        match *self {
            Self::Long { t0, dt } => i64::time_at(t0, dt, index) as f64,
            Self::Double { t0, dt } => f64::time_at(t0, dt, index),
        }
    }

    /// Timestamps of `count` samples starting at sample `first`
    pub fn timestamps(&self, first: usize, count: usize) -> Vec<f64> {
        (0..count)
            .map(|i| self.time_at(first.wrapping_add(i)))
            .collect()
    }

    /// Reject a zero or non-finite sample interval
    pub fn validate(&self) -> Result<()> {
        let valid = match *self {
            Self::Long { dt, .. } => i64::is_valid_step(dt),
            Self::Double { dt, .. } => f64::is_valid_step(dt),
        };
        if valid {
            Ok(())
        } else {
            Err(TimeseriesError::InvalidTimebase(format!(
                "dt must be non-zero and finite, got {}",
                self.dt()
            )))
        }
    }
}

/// Write the timebase block for a typed pair
pub fn write_timebase<S, T>(region: &mut Region<S>, t0: T, dt: T) -> Result<()>
where
    S: Write + Seek,
    T: TimeValue,
{
    T::into_timebase(t0, dt).validate()?;
    region.framed(TIMEBASE_SIZE, |r| {
        write_dtype(r, T::DTYPE)?;
        r.put(&t0)?;
        r.put(&dt)
    })
}

/// Write the timebase block for a dynamic timebase
pub fn write_timebase_any<S: Write + Seek>(
    region: &mut Region<S>,
    timebase: &Timebase,
) -> Result<()> {
    match *timebase {
        Timebase::Long { t0, dt } => write_timebase(region, t0, dt),
        Timebase::Double { t0, dt } => write_timebase(region, t0, dt),
    }
}

/// Read the timebase block, requiring the kind of `T`
pub fn read_timebase<S, T>(region: &mut Region<S>) -> Result<(T, T)>
where
    S: Read + Seek,
    T: TimeValue,
{
    region.framed(TIMEBASE_SIZE, |r| {
        let dtype = read_dtype(r)?;
        if dtype != T::DTYPE {
            return Err(TimeseriesError::TypeMismatch {
                expected: T::DTYPE,
                actual: dtype,
            });
        }
        let t0: T = r.get()?;
        let dt: T = r.get()?;
        Ok((t0, dt))
    })
}

/// Read the timebase block of whichever kind is recorded
pub fn read_timebase_any<S: Read + Seek>(region: &mut Region<S>) -> Result<Timebase> {
    region.framed(TIMEBASE_SIZE, |r| {
        let dtype = read_dtype(r)?;
        match TimeKind::from_dtype(dtype) {
            Some(TimeKind::Long) => Ok(Timebase::Long {
                t0: r.get()?,
                dt: r.get()?,
            }),
            Some(TimeKind::Double) => Ok(Timebase::Double {
                t0: r.get()?,
                dt: r.get()?,
            }),
            None => Err(TimeseriesError::UnsupportedType {
                dtype,
                field: "timebase",
            }),
        }
    })
}

/// Timestamps `t0 + (source_offset + i) * dt` for `i` in `0..count`
pub fn build_timebase<T: TimeValue>(t0: T, dt: T, count: usize, source_offset: usize) -> Vec<T> {
    (0..count)
        .map(|i| T::time_at(t0, dt, source_offset.wrapping_add(i)))
        .collect()
}

/// Write `count` timestamps into `target`, starting at `target_offset`
pub fn fill_timebase<T: TimeValue>(
    target: &mut [T],
    target_offset: usize,
    count: usize,
    t0: T,
    dt: T,
    source_offset: usize,
) -> Result<()> {
    let len = target.len();
    let end = target_offset.saturating_add(count);
    let slots = target
        .get_mut(target_offset..end)
        .ok_or(TimeseriesError::SizeMismatch {
            expected: end,
            actual: len,
        })?;
    for (i, slot) in slots.iter_mut().enumerate() {
        *slot = T::time_at(t0, dt, source_offset.wrapping_add(i));
    }
    Ok(())
}
