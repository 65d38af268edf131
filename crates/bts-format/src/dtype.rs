//! Data type registry for timeseries fields
//!
//! Every typed field in a region is preceded by a single tag byte naming its
//! wire representation. The registry maps each tag to a byte width, a
//! one-letter code and a display name. All lookups go through [`REGISTRY`],
//! so a new representation is one more row plus one more [`Sample`]
//! implementation.
//!
//! | Tag | Name   | Width | Rust type |
//! |-----|--------|-------|-----------|
//! | 0   | none   | 0     | -         |
//! | 1   | byte   | 1     | `i8`      |
//! | 2   | short  | 2     | `i16`     |
//! | 3   | int    | 4     | `i32`     |
//! | 4   | long   | 8     | `i64`     |
//! | 5   | float  | 4     | `f32`     |
//! | 6   | double | 8     | `f64`     |

use crate::error::{Result, TimeseriesError};
use crate::region::Region;
use crate::values::Samples;
use binrw::{BinRead, BinWrite};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Seek, Write};

/// Wire representation of a typed field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DataType {
    /// No value; used by a disabled scaling block
    None = 0,
    /// 8-bit signed integer
    Byte = 1,
    /// 16-bit signed integer
    Short = 2,
    /// 32-bit signed integer
    Int = 3,
    /// 64-bit signed integer
    Long = 4,
    /// 32-bit IEEE 754 float
    Float = 5,
    /// 64-bit IEEE 754 float
    Double = 6,
}

/// One row of the type registry
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    /// Registered type
    pub dtype: DataType,
    /// Encoded width in bytes
    pub width: usize,
    /// One-letter code used in file names and diagnostics
    pub code: char,
    /// Display name
    pub name: &'static str,
}

/// Registry rows, indexed by tag byte
pub static REGISTRY: [TypeInfo; 7] = [
    TypeInfo { dtype: DataType::None, width: 0, code: 'N', name: "none" },
    TypeInfo { dtype: DataType::Byte, width: 1, code: 'B', name: "byte" },
    TypeInfo { dtype: DataType::Short, width: 2, code: 'S', name: "short" },
    TypeInfo { dtype: DataType::Int, width: 4, code: 'I', name: "int" },
    TypeInfo { dtype: DataType::Long, width: 8, code: 'L', name: "long" },
    TypeInfo { dtype: DataType::Float, width: 4, code: 'F', name: "float" },
    TypeInfo { dtype: DataType::Double, width: 8, code: 'D', name: "double" },
];

impl DataType {
    /// Look up a type by its tag byte
    pub fn from_tag(tag: u8) -> Result<Self> {
        REGISTRY
            .get(tag as usize)
            .map(|info| info.dtype)
            .ok_or(TimeseriesError::UnknownTag(tag))
    }

    /// Tag byte written on the wire
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Registry row for this type
    pub fn info(self) -> &'static TypeInfo {
        &REGISTRY[self as usize]
    }

    /// Encoded width in bytes
    pub fn width(self) -> usize {
        self.info().width
    }

    /// One-letter code (N, B, S, I, L, F, D)
    pub fn code(self) -> char {
        self.info().code
    }

    /// Display name
    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Whether the type carries a value (everything except `None`)
    pub const fn is_numeric(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Whether the type can describe a timebase
    pub const fn is_time(self) -> bool {
        matches!(self, Self::Long | Self::Double)
    }
}

impl TryFrom<u8> for DataType {
    type Error = TimeseriesError;

    fn try_from(tag: u8) -> Result<Self> {
        Self::from_tag(tag)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Width in bytes of the type with the given tag
pub fn width_of(tag: u8) -> Result<usize> {
    DataType::from_tag(tag).map(DataType::width)
}

/// Write a dtype tag byte
pub fn write_dtype<S: Write + Seek>(region: &mut Region<S>, dtype: DataType) -> Result<()> {
    region.put(&dtype.tag())
}

/// Read a dtype tag byte
pub fn read_dtype<S: Read + Seek>(region: &mut Region<S>) -> Result<DataType> {
    let tag: u8 = region.get()?;
    DataType::from_tag(tag)
}

/// A single dynamically typed value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    /// 8-bit signed integer
    Byte(i8),
    /// 16-bit signed integer
    Short(i16),
    /// 32-bit signed integer
    Int(i32),
    /// 64-bit signed integer
    Long(i64),
    /// 32-bit float
    Float(f32),
    /// 64-bit float
    Double(f64),
}

impl Scalar {
    /// Registered type of this value
    pub const fn dtype(self) -> DataType {
        match self {
            Self::Byte(_) => DataType::Byte,
            Self::Short(_) => DataType::Short,
            Self::Int(_) => DataType::Int,
            Self::Long(_) => DataType::Long,
            Self::Float(_) => DataType::Float,
            Self::Double(_) => DataType::Double,
        }
    }

    /// Value widened to `f64`
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Byte(v) => v.to_f64(),
            Self::Short(v) => v.to_f64(),
            Self::Int(v) => v.to_f64(),
            Self::Long(v) => v.to_f64(),
            Self::Float(v) => v.to_f64(),
            Self::Double(v) => v,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byte(v) => write!(f, "{v}"),
            Self::Short(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
        }
    }
}

/// Encode a value at its native width
pub fn encode_scalar<S: Write + Seek>(region: &mut Region<S>, value: Scalar) -> Result<()> {
    region.framed(value.dtype().width() as u64, |r| match value {
        Scalar::Byte(v) => r.put(&v),
        Scalar::Short(v) => r.put(&v),
        Scalar::Int(v) => r.put(&v),
        Scalar::Long(v) => r.put(&v),
        Scalar::Float(v) => r.put(&v),
        Scalar::Double(v) => r.put(&v),
    })
}

/// Decode a value of the given type
///
/// `DataType::None` consumes nothing and yields `None`.
pub fn decode_scalar<S: Read + Seek>(
    region: &mut Region<S>,
    dtype: DataType,
) -> Result<Option<Scalar>> {
    region.framed(dtype.width() as u64, |r| {
        Ok(match dtype {
            DataType::None => None,
            DataType::Byte => Some(Scalar::Byte(r.get()?)),
            DataType::Short => Some(Scalar::Short(r.get()?)),
            DataType::Int => Some(Scalar::Int(r.get()?)),
            DataType::Long => Some(Scalar::Long(r.get()?)),
            DataType::Float => Some(Scalar::Float(r.get()?)),
            DataType::Double => Some(Scalar::Double(r.get()?)),
        })
    })
}

mod sealed {
    pub trait Sealed {}
}

/// Rust primitive that maps to one registered numeric type
pub trait Sample:
    sealed::Sealed
    + Copy
    + Default
    + PartialEq
    + fmt::Debug
    + for<'a> BinRead<Args<'a> = ()>
    + for<'a> BinWrite<Args<'a> = ()>
{
    /// Registered type of this primitive
    const DTYPE: DataType;

    /// Wrap as a dynamic scalar
    fn into_scalar(self) -> Scalar;

    /// Unwrap a dynamic scalar of the same type
    fn from_scalar(value: Scalar) -> Option<Self>;

    /// Wrap a vector as a dynamic sample array
    fn into_samples(values: Vec<Self>) -> Samples;

    /// Borrow the vector of a dynamic sample array of the same type
    fn from_samples(samples: &Samples) -> Option<&[Self]>;

    /// Value widened to `f64`
    fn to_f64(self) -> f64;
}

macro_rules! impl_sample {
    ($ty:ty, $variant:ident) => {
        impl sealed::Sealed for $ty {}

        impl Sample for $ty {
            const DTYPE: DataType = DataType::$variant;

            fn into_scalar(self) -> Scalar {
                Scalar::$variant(self)
            }

            fn from_scalar(value: Scalar) -> Option<Self> {
                match value {
                    Scalar::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn into_samples(values: Vec<Self>) -> Samples {
                Samples::$variant(values)
            }

            fn from_samples(samples: &Samples) -> Option<&[Self]> {
                match samples {
                    Samples::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn to_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

impl_sample!(i8, Byte);
impl_sample!(i16, Short);
impl_sample!(i32, Int);
impl_sample!(i64, Long);
impl_sample!(f32, Float);
impl_sample!(f64, Double);

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_registry_rows_match_tags() {
        for (tag, info) in REGISTRY.iter().enumerate() {
            assert_eq!(info.dtype.tag() as usize, tag);
        }
    }

    #[test]
    fn test_widths() {
        assert_eq!(width_of(0).unwrap(), 0);
        assert_eq!(width_of(1).unwrap(), 1);
        assert_eq!(width_of(2).unwrap(), 2);
        assert_eq!(width_of(3).unwrap(), 4);
        assert_eq!(width_of(4).unwrap(), 8);
        assert_eq!(width_of(5).unwrap(), 4);
        assert_eq!(width_of(6).unwrap(), 8);
    }

    #[test]
    fn test_unknown_tag() {
        assert!(matches!(
            DataType::from_tag(7),
            Err(TimeseriesError::UnknownTag(7))
        ));
        assert!(matches!(
            DataType::try_from(0xFF),
            Err(TimeseriesError::UnknownTag(0xFF))
        ));
    }

    #[test]
    fn test_codes_and_names() {
        let codes: String = REGISTRY.iter().map(|info| info.code).collect();
        assert_eq!(codes, "NBSILFD");
        assert_eq!(DataType::Short.to_string(), "short");
        assert_eq!(DataType::None.to_string(), "none");
    }

    #[test]
    fn test_type_classes() {
        assert!(!DataType::None.is_numeric());
        assert!(DataType::Byte.is_numeric());
        assert!(DataType::Long.is_time());
        assert!(DataType::Double.is_time());
        assert!(!DataType::Int.is_time());
        assert!(!DataType::Float.is_time());
    }

    #[test]
    fn test_sample_dtypes_agree_with_widths() {
        assert_eq!(i8::DTYPE.width(), std::mem::size_of::<i8>());
        assert_eq!(i16::DTYPE.width(), std::mem::size_of::<i16>());
        assert_eq!(i32::DTYPE.width(), std::mem::size_of::<i32>());
        assert_eq!(i64::DTYPE.width(), std::mem::size_of::<i64>());
        assert_eq!(f32::DTYPE.width(), std::mem::size_of::<f32>());
        assert_eq!(f64::DTYPE.width(), std::mem::size_of::<f64>());
    }

    #[test]
    fn test_scalar_encode_decode() {
        let values = [
            Scalar::Byte(-3),
            Scalar::Short(-1234),
            Scalar::Int(0x0102_0304),
            Scalar::Long(-9_000_000_000),
            Scalar::Float(1.5),
            Scalar::Double(-2.25),
        ];

        let mut buf = Vec::new();
        let mut region = Region::new(Cursor::new(&mut buf));
        for value in values {
            encode_scalar(&mut region, value).unwrap();
        }
        assert_eq!(buf.len(), 1 + 2 + 4 + 8 + 4 + 8);

        let mut region = Region::new(Cursor::new(&buf));
        for value in values {
            let decoded = decode_scalar(&mut region, value.dtype()).unwrap();
            assert_eq!(decoded, Some(value));
        }
    }

    #[test]
    fn test_decode_none_consumes_nothing() {
        let buf = [0xAAu8; 4];
        let mut region = Region::new(Cursor::new(&buf[..]));
        assert_eq!(decode_scalar(&mut region, DataType::None).unwrap(), None);
        assert_eq!(region.position().unwrap(), 0);
    }

    #[test]
    fn test_scalar_big_endian_bytes() {
        let mut buf = Vec::new();
        let mut region = Region::new(Cursor::new(&mut buf));
        encode_scalar(&mut region, Scalar::Int(1)).unwrap();
        assert_eq!(buf, vec![0, 0, 0, 1]);
    }

    #[test]
    fn test_scalar_round_trips_through_sample() {
        assert_eq!(i16::from_scalar(7i16.into_scalar()), Some(7));
        assert_eq!(i16::from_scalar(Scalar::Int(7)), None);
        assert_eq!(Scalar::Short(-4).as_f64(), -4.0);
        assert_eq!(Scalar::Float(0.5).to_string(), "0.5");
    }
}
