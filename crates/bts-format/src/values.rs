//! Value array codec: dtype tag, int32 count, then the samples back to back
//!
//! Samples are written at their native width in the region's byte order.
//! Sub-range reads seek past the leading samples instead of decoding them.

use crate::dtype::{DataType, Sample, Scalar, read_dtype, write_dtype};
use crate::error::{Result, TimeseriesError};
use crate::region::Region;
use serde::{Deserialize, Serialize};
use std::io::{Read, Seek, Write};

/// Encoded size of the dtype tag and count that precede the samples
pub const COUNT_PREFIX_SIZE: u64 = 5;

/// A dynamically typed sample array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Samples {
    /// `byte` samples
    Byte(Vec<i8>),
    /// `short` samples
    Short(Vec<i16>),
    /// `int` samples
    Int(Vec<i32>),
    /// `long` samples
    Long(Vec<i64>),
    /// `float` samples
    Float(Vec<f32>),
    /// `double` samples
    Double(Vec<f64>),
}

macro_rules! dispatch_samples {
    ($samples:expr, $values:ident => $body:expr) => {
        match $samples {
            Samples::Byte($values) => $body,
            Samples::Short($values) => $body,
            Samples::Int($values) => $body,
            Samples::Long($values) => $body,
            Samples::Float($values) => $body,
            Samples::Double($values) => $body,
        }
    };
}

impl Samples {
    /// Wrap a typed vector
    pub fn from_vec<T: Sample>(values: Vec<T>) -> Self {
        T::into_samples(values)
    }

    /// Borrow as a typed slice, if the element type matches
    pub fn as_slice<T: Sample>(&self) -> Option<&[T]> {
        T::from_samples(self)
    }

    /// Registered type of the elements
    pub fn dtype(&self) -> DataType {
        dispatch_samples!(self, values => sample_dtype(values.as_slice()))
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        dispatch_samples!(self, values => values.len())
    }

    /// Whether there are no samples
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample at `index` as a dynamic scalar
    pub fn get(&self, index: usize) -> Option<Scalar> {
        dispatch_samples!(self, values => values.get(index).map(|v| v.into_scalar()))
    }

    /// Samples widened to `f64`
    pub fn to_f64_vec(&self) -> Vec<f64> {
        dispatch_samples!(self, values => values.iter().map(|v| v.to_f64()).collect())
    }
}

fn sample_dtype<T: Sample>(_values: &[T]) -> DataType {
    T::DTYPE
}

/// Encoded size of the count prefix plus `count` samples of `dtype`
pub fn data_block_size(dtype: DataType, count: usize) -> u64 {
    COUNT_PREFIX_SIZE + (dtype.width() * count) as u64
}

/// Write the dtype tag, count and samples
pub fn write_values<S, T>(region: &mut Region<S>, values: &[T]) -> Result<()>
where
    S: Write + Seek,
    T: Sample,
{
    let count =
        i32::try_from(values.len()).map_err(|_| TimeseriesError::TooManySamples(values.len()))?;
    region.framed(data_block_size(T::DTYPE, values.len()), |r| {
        write_dtype(r, T::DTYPE)?;
        r.put(&count)?;
        for value in values {
            r.put(value)?;
        }
        Ok(())
    })
}

/// Write a dynamic sample array
pub fn write_samples<S: Write + Seek>(region: &mut Region<S>, samples: &Samples) -> Result<()> {
    dispatch_samples!(samples, values => write_values(region, values))
}

/// Read the dtype tag and count, requiring the element type of `T`
pub fn read_count<S, T>(region: &mut Region<S>) -> Result<usize>
where
    S: Read + Seek,
    T: Sample,
{
    let (dtype, count) = read_data_header(region)?;
    if dtype != T::DTYPE {
        return Err(TimeseriesError::TypeMismatch {
            expected: T::DTYPE,
            actual: dtype,
        });
    }
    Ok(count)
}

/// Read the dtype tag and count of whichever element type is recorded
pub fn read_data_header<S: Read + Seek>(region: &mut Region<S>) -> Result<(DataType, usize)> {
    region.framed(COUNT_PREFIX_SIZE, |r| {
        let dtype = read_dtype(r)?;
        let count: i32 = r.get()?;
        if !dtype.is_numeric() {
            return Err(TimeseriesError::UnsupportedType {
                dtype,
                field: "data",
            });
        }
        let count = usize::try_from(count).map_err(|_| TimeseriesError::InvalidCount(count))?;
        Ok((dtype, count))
    })
}

/// Skip `element_offset` samples, then fill `destination`
///
/// The bytes for the whole span must be present; a short buffer fails with
/// `Truncated` before anything is decoded.
pub fn read_values<S, T>(
    region: &mut Region<S>,
    destination: &mut [T],
    element_offset: usize,
) -> Result<()>
where
    S: Read + Seek,
    T: Sample,
{
    let width = T::DTYPE.width() as u64;
    let skipped = element_offset as u64 * width;
    let body = destination.len() as u64 * width;
    ensure_span(region, T::DTYPE, element_offset, destination.len())?;
    region.framed(skipped + body, |r| {
        r.skip(skipped)?;
        for slot in destination.iter_mut() {
            *slot = r.get()?;
        }
        Ok(())
    })
}

/// Fail with `Truncated` unless `element_offset + count` samples of `dtype`
/// follow the cursor
///
/// Run before allocating a destination, so a corrupt count cannot request
/// more memory than the buffer could fill.
pub fn ensure_span<S: Read + Seek>(
    region: &mut Region<S>,
    dtype: DataType,
    element_offset: usize,
    count: usize,
) -> Result<()> {
    let width = dtype.width() as u64;
    let samples = (element_offset as u64).saturating_add(count as u64);
    region.ensure_available(samples.saturating_mul(width))
}

fn read_vec<S, T>(region: &mut Region<S>, count: usize, element_offset: usize) -> Result<Vec<T>>
where
    S: Read + Seek,
    T: Sample,
{
    ensure_span(region, T::DTYPE, element_offset, count)?;
    let mut values = vec![T::default(); count];
    read_values(region, &mut values, element_offset)?;
    Ok(values)
}

/// Read `count` samples of `dtype` after skipping `element_offset` samples
pub fn read_samples<S: Read + Seek>(
    region: &mut Region<S>,
    dtype: DataType,
    count: usize,
    element_offset: usize,
) -> Result<Samples> {
    Ok(match dtype {
        DataType::Byte => Samples::Byte(read_vec(region, count, element_offset)?),
        DataType::Short => Samples::Short(read_vec(region, count, element_offset)?),
        DataType::Int => Samples::Int(read_vec(region, count, element_offset)?),
        DataType::Long => Samples::Long(read_vec(region, count, element_offset)?),
        DataType::Float => Samples::Float(read_vec(region, count, element_offset)?),
        DataType::Double => Samples::Double(read_vec(region, count, element_offset)?),
        DataType::None => {
            return Err(TimeseriesError::UnsupportedType {
                dtype,
                field: "data",
            });
        }
    })
}
