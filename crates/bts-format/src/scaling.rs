//! Scaling block: optional linear mapping from raw to physical values
//!
//! The block is a dtype tag followed by two 8-byte slots holding `offset` and
//! `scale`. Values narrower than 8 bytes sit at the start of their slot and
//! the remainder is zero. A `none` tag leaves both slots zero.
//!
//! Scaling is metadata only: decoding a region never applies it. Callers who
//! want physical values ask for them through [`Scaling::apply`].

use crate::dtype::{DataType, Sample, Scalar, decode_scalar, encode_scalar, read_dtype, write_dtype};
use crate::error::{Result, TimeseriesError};
use crate::region::Region;
use crate::values::Samples;
use serde::{Deserialize, Serialize};
use std::io::{Read, Seek, Write};

/// Width of each scaling slot
pub const SCALING_SLOT: usize = 8;

/// Encoded size of the scaling block
pub const SCALING_SIZE: u64 = 1 + 2 * SCALING_SLOT as u64;

/// Linear scaling `physical = raw * scale + offset`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum Scaling {
    /// Raw values are already physical
    #[default]
    Disabled,
    /// Offset and scale of one registered type
    Linear {
        /// Added after scaling
        offset: Scalar,
        /// Raw value multiplier
        scale: Scalar,
    },
}

impl Scaling {
    /// Linear scaling with typed parameters
    pub fn linear<T: Sample>(offset: T, scale: T) -> Self {
        Self::Linear {
            offset: offset.into_scalar(),
            scale: scale.into_scalar(),
        }
    }

    /// Registered type of the parameters, `None` when disabled
    pub const fn dtype(&self) -> DataType {
        match self {
            Self::Disabled => DataType::None,
            Self::Linear { offset, .. } => offset.dtype(),
        }
    }

    /// Whether a mapping is present
    pub const fn is_enabled(&self) -> bool {
        matches!(self, Self::Linear { .. })
    }

    /// Map one raw value to its physical value
    pub fn apply(&self, raw: f64) -> f64 {
        match self {
            Self::Disabled => raw,
            Self::Linear { offset, scale } => raw.mul_add(scale.as_f64(), offset.as_f64()),
        }
    }

    /// Map every sample to its physical value
    pub fn apply_all(&self, samples: &Samples) -> Vec<f64> {
        samples
            .to_f64_vec()
            .into_iter()
            .map(|raw| self.apply(raw))
            .collect()
    }
}

/// Whether a scaling dtype tag denotes an enabled mapping
pub fn has_scaling(dtype: DataType) -> bool {
    dtype != DataType::None
}

/// Write a `none` scaling block
pub fn write_scaling_disabled<S: Write + Seek>(region: &mut Region<S>) -> Result<()> {
    region.framed(SCALING_SIZE, |r| {
        write_dtype(r, DataType::None)?;
        r.put_zeros(2 * SCALING_SLOT)
    })
}

/// Write an enabled scaling block with typed parameters
pub fn write_scaling<S, T>(region: &mut Region<S>, offset: T, scale: T) -> Result<()>
where
    S: Write + Seek,
    T: Sample,
{
    region.framed(SCALING_SIZE, |r| {
        write_dtype(r, T::DTYPE)?;
        write_slot(r, offset.into_scalar())?;
        write_slot(r, scale.into_scalar())
    })
}

/// Write the scaling block for a dynamic descriptor
pub fn write_scaling_descriptor<S: Write + Seek>(
    region: &mut Region<S>,
    scaling: &Scaling,
) -> Result<()> {
    match *scaling {
        Scaling::Disabled => write_scaling_disabled(region),
        Scaling::Linear { offset, scale } => {
            if offset.dtype() != scale.dtype() {
                return Err(TimeseriesError::TypeMismatch {
                    expected: offset.dtype(),
                    actual: scale.dtype(),
                });
            }
            region.framed(SCALING_SIZE, |r| {
                write_dtype(r, offset.dtype())?;
                write_slot(r, offset)?;
                write_slot(r, scale)
            })
        }
    }
}

fn write_slot<S: Write + Seek>(region: &mut Region<S>, value: Scalar) -> Result<()> {
    encode_scalar(region, value)?;
    region.put_zeros(SCALING_SLOT - value.dtype().width())
}

/// Decode the scaling block
pub fn read_scaling<S: Read + Seek>(region: &mut Region<S>) -> Result<Scaling> {
    region.framed(SCALING_SIZE, |r| {
        let dtype = read_dtype(r)?;
        let offset = read_slot(r, dtype)?;
        let scale = read_slot(r, dtype)?;
        Ok(match (offset, scale) {
            (Some(offset), Some(scale)) => Scaling::Linear { offset, scale },
            _ => Scaling::Disabled,
        })
    })
}

fn read_slot<S: Read + Seek>(region: &mut Region<S>, dtype: DataType) -> Result<Option<Scalar>> {
    let value = decode_scalar(region, dtype)?;
    region.skip((SCALING_SLOT - dtype.width()) as u64)?;
    Ok(value)
}

/// Advance past the scaling block without decoding it
pub fn skip_scaling<S: Seek>(region: &mut Region<S>) -> Result<()> {
    region.skip(SCALING_SIZE)
}
