//! Binary codec for evenly sampled timeseries
//!
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::cast_possible_wrap)] // Intentional for binary operations
#![allow(clippy::cast_sign_loss)] // Index arithmetic on validated values
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::cast_precision_loss)] // Timestamps widened to f64
#![allow(clippy::doc_markdown)] // Dtype names don't need backticks
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::float_cmp)] // Exact round trips
#![allow(clippy::derive_partial_eq_without_eq)] // Descriptors carry floats
#![allow(clippy::return_self_not_must_use)] // Builder patterns
//! A region stores one series of samples taken at `t0 + i * dt`, preceded by
//! a fixed 64-byte header:
//!
//! - **Endianness marker**: int16 `1` in the writer's byte order; readers
//!   that see `256` flip their order and continue
//! - **Timebase**: `long` or `double` `t0` and `dt`
//! - **Scaling**: optional linear mapping from raw to physical values
//! - **Data**: dtype tag, int32 count, then the raw samples
//!
//! # Design Principles
//!
//! - **Table-Driven Types**: one registry row per wire type, one generic
//!   array codec for all of them
//! - **Explicit Cursor**: every primitive takes a `&mut Region`, so the codec
//!   runs over any seekable stream, including memory-mapped files
//! - **Sub-Range Reads**: time windows resolve to index ranges, and only the
//!   requested samples are decoded
//! - **Round-Trip Guarantee**: parse(build(data)) == data
//!
//! # Example
//!
//! ```
//! use bts_format::{Region, Timeseries, layout};
//! use std::io::Cursor;
//!
//! let series = Timeseries::builder()
//!     .timebase(0i64, 10)
//!     .samples(vec![0i32, 100, 200, 300, 400])
//!     .build()?;
//! let data = series.build()?;
//!
//! let window: Vec<i32> = layout::read_range(&mut Region::new(Cursor::new(&data)), 15i64, 45)?;
//! assert_eq!(window, vec![200, 300, 400]);
//! # Ok::<(), bts_format::TimeseriesError>(())
//! ```

#![warn(missing_docs)]

/// Builder for timeseries records
pub mod builder;
/// Data type registry, scalars and the `Sample` trait
pub mod dtype;
/// Endianness marker negotiation
pub mod endian;
/// Error types
pub mod error;
/// Dynamic header decoding and diagnostics
pub mod header;
/// Time window to sample index resolution
pub mod interval;
/// Region assembly and typed read paths
///
/// See the [`layout`] module for the byte-exact field offsets.
pub mod layout;
/// Byte region with cursor and byte order
pub mod region;
/// Scaling block codec
pub mod scaling;
/// Typed timeseries record
pub mod timeseries;
/// Timebase block codec
pub mod timebase;
/// Value array codec
pub mod values;

pub use binrw::Endian;
pub use builder::TimeseriesBuilder;
pub use dtype::{DataType, Sample, Scalar};
pub use error::{Result, TimeseriesError};
pub use header::{RegionHeader, explain_header, read_header, read_index_range};
pub use interval::{IndexInterval, index_interval};
pub use layout::{HEADER_SIZE, region_size};
pub use region::Region;
pub use scaling::Scaling;
pub use timebase::{TimeKind, TimeValue, Timebase, build_timebase};
pub use timeseries::Timeseries;
pub use values::Samples;

/// Common format trait for types with a binary region form
pub trait BinaryFormat: Sized {
    /// Parse from bytes
    fn parse(data: &[u8]) -> Result<Self>;

    /// Build to bytes
    fn build(&self) -> Result<Vec<u8>>;

    /// Verify round-trip correctness
    fn verify_round_trip(data: &[u8]) -> Result<()> {
        let parsed = Self::parse(data)?;
        let rebuilt = parsed.build()?;
        if data != rebuilt.as_slice() {
            return Err(TimeseriesError::RoundTripMismatch {
                original: data.len(),
                rebuilt: rebuilt.len(),
            });
        }
        Ok(())
    }
}

impl BinaryFormat for Timeseries {
    fn parse(data: &[u8]) -> Result<Self> {
        Self::parse(data)
    }

    fn build(&self) -> Result<Vec<u8>> {
        self.build()
    }
}
