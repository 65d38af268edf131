//! Complete timeseries record

use crate::builder::TimeseriesBuilder;
use crate::endian::write_marker;
use crate::error::{Result, TimeseriesError};
use crate::header::{RegionHeader, read_header};
use crate::layout::{HEADER_SIZE, region_size, write_reserved};
use crate::region::Region;
use crate::scaling::{Scaling, write_scaling_descriptor};
use crate::timebase::{Timebase, write_timebase_any};
use crate::values::{Samples, read_samples, write_samples};
use binrw::Endian;
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Read, Seek, Write};

/// An evenly sampled series with its timebase and optional scaling
///
/// Binary layout: marker → timebase → scaling → reserved → samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeseries {
    /// Reference time and sample interval
    pub timebase: Timebase,
    /// Raw-to-physical mapping, recorded but not applied on decode
    pub scaling: Scaling,
    /// Raw samples
    pub samples: Samples,
}

impl Timeseries {
    /// Start building a record
    pub fn builder() -> TimeseriesBuilder {
        TimeseriesBuilder::new()
    }

    /// Parse a region from binary data, in either byte order
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE as usize {
            return Err(TimeseriesError::Truncated {
                expected: HEADER_SIZE,
                available: data.len() as u64,
            });
        }
        Self::read_from(&mut Region::new(Cursor::new(data)))
    }

    /// Decode a region at the cursor
    pub fn read_from<S: Read + Seek>(region: &mut Region<S>) -> Result<Self> {
        let header = read_header(region)?;
        let samples = read_samples(region, header.dtype, header.count, 0)?;
        Ok(Self {
            timebase: header.timebase,
            scaling: header.scaling,
            samples,
        })
    }

    /// Build the big-endian binary form
    pub fn build(&self) -> Result<Vec<u8>> {
        self.build_with_endian(Endian::Big)
    }

    /// Build the binary form in the given byte order
    pub fn build_with_endian(&self, endian: Endian) -> Result<Vec<u8>> {
        let mut buffer = Vec::with_capacity(self.region_size() as usize);
        self.write_to(&mut Region::with_endian(Cursor::new(&mut buffer), endian))?;
        Ok(buffer)
    }

    /// Encode the region at the cursor
    pub fn write_to<S: Write + Seek>(&self, region: &mut Region<S>) -> Result<()> {
        self.validate()?;
        region.framed(self.region_size(), |r| {
            write_marker(r)?;
            write_timebase_any(r, &self.timebase)?;
            write_scaling_descriptor(r, &self.scaling)?;
            write_reserved(r)?;
            write_samples(r, &self.samples)
        })
    }

    /// Check the record can be encoded
    pub fn validate(&self) -> Result<()> {
        self.timebase.validate()?;
        if i32::try_from(self.samples.len()).is_err() {
            return Err(TimeseriesError::TooManySamples(self.samples.len()));
        }
        if let Scaling::Linear { offset, scale } = self.scaling
            && offset.dtype() != scale.dtype()
        {
            return Err(TimeseriesError::TypeMismatch {
                expected: offset.dtype(),
                actual: scale.dtype(),
            });
        }
        Ok(())
    }

    /// Header describing this record
    pub fn header(&self) -> RegionHeader {
        RegionHeader {
            timebase: self.timebase,
            scaling: self.scaling,
            dtype: self.samples.dtype(),
            count: self.samples.len(),
            payload_start: HEADER_SIZE,
        }
    }

    /// Encoded size in bytes
    pub fn region_size(&self) -> u64 {
        region_size(self.samples.dtype().width(), self.samples.len())
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the series holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Timestamp of every sample
    pub fn timestamps(&self) -> Vec<f64> {
        self.timebase.timestamps(0, self.samples.len())
    }

    /// Samples with scaling applied
    pub fn scaled(&self) -> Vec<f64> {
        self.scaling.apply_all(&self.samples)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::dtype::{DataType, Scalar};
    use pretty_assertions::assert_eq;

    fn sample_series() -> Timeseries {
        Timeseries {
            timebase: Timebase::Double { t0: 13.0, dt: 37.0 },
            scaling: Scaling::linear(1.2f32, 24.3f32),
            samples: Samples::Int(vec![-3, 0, 7, 1_000_000]),
        }
    }

    #[test]
    fn test_round_trip() {
        let series = sample_series();
        let data = series.build().expect("Should build");
        assert_eq!(data.len() as u64, series.region_size());
        assert_eq!(data.len(), 64 + 4 * 4);

        let parsed = Timeseries::parse(&data).expect("Should parse");
        assert_eq!(parsed, series);
    }

    #[test]
    fn test_round_trip_little_endian() {
        let series = sample_series();
        let data = series.build_with_endian(Endian::Little).expect("Should build");
        assert_eq!(&data[0..2], &[0x01, 0x00]);
        assert_eq!(Timeseries::parse(&data).expect("Should parse"), series);
    }

    #[test]
    fn test_empty_series() {
        let series = Timeseries {
            timebase: Timebase::Long { t0: 0, dt: 1 },
            scaling: Scaling::Disabled,
            samples: Samples::Byte(Vec::new()),
        };
        let data = series.build().unwrap();
        assert_eq!(data.len(), 64);

        let parsed = Timeseries::parse(&data).unwrap();
        assert!(parsed.is_empty());
        assert_eq!(parsed, series);
    }

    #[test]
    fn test_parse_too_short() {
        assert!(matches!(
            Timeseries::parse(&[0u8; 10]),
            Err(TimeseriesError::Truncated {
                expected: 64,
                available: 10
            })
        ));
    }

    #[test]
    fn test_parse_truncated_payload() {
        let data = sample_series().build().unwrap();
        assert!(matches!(
            Timeseries::parse(&data[..data.len() - 1]),
            Err(TimeseriesError::Truncated { .. })
        ));
    }

    #[test]
    fn test_parse_inflated_count() {
        let empty = Timeseries::builder().build().unwrap();
        let mut data = empty.build().unwrap();
        assert_eq!(data.len(), 64);
        data[60..64].copy_from_slice(&i32::MAX.to_be_bytes());

        assert!(matches!(
            Timeseries::parse(&data),
            Err(TimeseriesError::Truncated {
                expected: 17_179_869_176,
                available: 0
            })
        ));
    }

    #[test]
    fn test_build_rejects_invalid_timebase() {
        let mut series = sample_series();
        series.timebase = Timebase::Double { t0: 0.0, dt: 0.0 };
        assert!(matches!(
            series.build(),
            Err(TimeseriesError::InvalidTimebase(_))
        ));
    }

    #[test]
    fn test_build_rejects_mixed_scaling() {
        let mut series = sample_series();
        series.scaling = Scaling::Linear {
            offset: Scalar::Float(1.0),
            scale: Scalar::Double(2.0),
        };
        assert!(matches!(
            series.build(),
            Err(TimeseriesError::TypeMismatch {
                expected: DataType::Float,
                actual: DataType::Double
            })
        ));
    }

    #[test]
    fn test_header() {
        let header = sample_series().header();
        assert_eq!(header.dtype, DataType::Int);
        assert_eq!(header.count, 4);
        assert_eq!(header.region_size(), 80);
    }

    #[test]
    fn test_timestamps_and_scaling() {
        let series = Timeseries {
            timebase: Timebase::Long { t0: 100, dt: 5 },
            scaling: Scaling::linear(10.0f64, 0.5f64),
            samples: Samples::Short(vec![0, 2, 4]),
        };
        assert_eq!(series.timestamps(), vec![100.0, 105.0, 110.0]);
        assert_eq!(series.scaled(), vec![10.0, 11.0, 12.0]);

        // Decoding keeps raw values
        let parsed = Timeseries::parse(&series.build().unwrap()).unwrap();
        assert_eq!(parsed.samples, Samples::Short(vec![0, 2, 4]));
    }

    #[test]
    fn test_json_round_trip() {
        let series = sample_series();
        let json = serde_json::to_string(&series).unwrap();
        let back: Timeseries = serde_json::from_str(&json).unwrap();
        assert_eq!(back, series);
    }
}
