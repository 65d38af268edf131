//! Dynamic header decoding for regions of unknown type
//!
//! [`read_header`] decodes all 64 header bytes without the caller naming the
//! timestamp or sample types up front, leaving the cursor at the first
//! sample. [`explain_header`] renders the same fields as text for
//! diagnostics and never fails.

use crate::dtype::{DataType, Scalar, decode_scalar};
use crate::endian::{ENDIANNESS_MARKER, SWAPPED_MARKER, read_marker};
use crate::error::{Result, TimeseriesError};
use crate::interval::{IndexInterval, resolve_window};
use crate::layout::{
    DATA_OFFSET, HEADER_SIZE, RESERVED_OFFSET, RESERVED_SIZE, SCALING_OFFSET, TIMEBASE_OFFSET,
    region_size, skip_reserved,
};
use crate::region::Region;
use crate::scaling::{SCALING_SLOT, Scaling, read_scaling};
use crate::timebase::{Timebase, read_timebase_any};
use crate::values::{Samples, read_data_header, read_samples};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Cursor, Read, Seek};
use tracing::debug;

/// Decoded region header
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionHeader {
    /// Reference time and sample interval
    pub timebase: Timebase,
    /// Raw-to-physical mapping
    pub scaling: Scaling,
    /// Sample type
    pub dtype: DataType,
    /// Number of samples
    pub count: usize,
    /// Stream position of the first sample
    #[serde(default = "default_payload_start")]
    pub payload_start: u64,
}

const fn default_payload_start() -> u64 {
    HEADER_SIZE
}

impl RegionHeader {
    /// Bytes occupied by the samples
    pub fn payload_size(&self) -> u64 {
        (self.dtype.width() * self.count) as u64
    }

    /// Bytes occupied by the whole region
    pub fn region_size(&self) -> u64 {
        region_size(self.dtype.width(), self.count)
    }

    /// Indices of the recorded samples inside `[from, upto]`
    ///
    /// Integer timebases resolve on the integer timestamps inside the
    /// window, so large `t0` values keep full precision.
    pub fn window(&self, from: f64, upto: f64) -> Result<IndexInterval> {
        match self.timebase {
            Timebase::Long { t0, dt } => {
                if from.is_nan() || upto.is_nan() || from > upto {
                    return Err(TimeseriesError::InvalidInterval(format!(
                        "window [{from}, {upto}] is empty or not comparable"
                    )));
                }
                let (from, upto) = (from.ceil() as i64, upto.floor() as i64);
                if from > upto {
                    return Ok(IndexInterval::EMPTY);
                }
                resolve_window(t0, dt, from, upto, self.count)
            }
            Timebase::Double { t0, dt } => resolve_window(t0, dt, from, upto, self.count),
        }
    }
}

/// Decode the 64-byte header, leaving the cursor at the first sample
pub fn read_header<S: Read + Seek>(region: &mut Region<S>) -> Result<RegionHeader> {
    region.ensure_available(HEADER_SIZE)?;
    let payload_start = region.position()? + HEADER_SIZE;
    let header = region.framed(HEADER_SIZE, |r| {
        read_marker(r)?;
        let timebase = read_timebase_any(r)?;
        let scaling = read_scaling(r)?;
        skip_reserved(r)?;
        let (dtype, count) = read_data_header(r)?;
        Ok(RegionHeader {
            timebase,
            scaling,
            dtype,
            count,
            payload_start,
        })
    })?;

    debug!(
        endian = ?region.endian(),
        kind = ?header.timebase.kind(),
        dtype = %header.dtype,
        count = header.count,
        scaled = header.scaling.is_enabled(),
        "decoded region header"
    );
    Ok(header)
}

/// Read `count` samples starting at sample `first`
///
/// Seeks from the payload start recorded by [`read_header`], so the cursor
/// may sit anywhere and repeated calls read the same samples.
pub fn read_index_range<S: Read + Seek>(
    region: &mut Region<S>,
    header: &RegionHeader,
    first: usize,
    count: usize,
) -> Result<Samples> {
    let out_of_range = TimeseriesError::IndexOutOfRange {
        first,
        end: first.saturating_add(count),
        count: header.count,
    };
    match first.checked_add(count) {
        Some(end) if end <= header.count => {}
        _ => return Err(out_of_range),
    }
    region.seek_to(header.payload_start)?;
    read_samples(region, header.dtype, count, first)
}

/// Describe a header field by field
///
/// Each line gives the field offset, its length, what was read and what it
/// means. Decoding stops at the first invalid field.
pub fn explain_header(bytes: &[u8]) -> String {
    let Some(header) = bytes.get(..HEADER_SIZE as usize) else {
        return format!(
            "header must have a length of {HEADER_SIZE} bytes, got {}",
            bytes.len()
        );
    };

    let mut lines = Vec::new();
    let mut region = Region::new(Cursor::new(header));
    if let Err(e) = explain_fields(&mut region, &mut lines) {
        lines.push(format!("stopped: {e}"));
    }
    lines.join("\n")
}

fn field(
    lines: &mut Vec<String>,
    offset: u64,
    len: u64,
    reads: impl fmt::Display,
    meaning: impl fmt::Display,
) {
    lines.push(format!("{offset:>3} {len:>3} reads {reads} => {meaning}"));
}

fn explain_fields(region: &mut Region<Cursor<&[u8]>>, lines: &mut Vec<String>) -> Result<()> {
    let marker: i16 = region.get()?;
    match marker {
        ENDIANNESS_MARKER => field(lines, 0, 2, format!("{marker:#04x}"), "byte order ok"),
        SWAPPED_MARKER => {
            let endian = region.flip_endian();
            field(
                lines,
                0,
                2,
                format!("{marker:#04x}"),
                format!("byte order swapped, continuing as {endian:?}"),
            );
        }
        other => {
            field(
                lines,
                0,
                2,
                format!("{other:#04x}"),
                format!("invalid endianness check value: {other}"),
            );
            return Ok(());
        }
    }

    let Some(time_dtype) = explain_dtype(region, lines, TIMEBASE_OFFSET, "timebase")? else {
        return Ok(());
    };
    if !time_dtype.is_time() {
        lines.push(format!(
            "{TIMEBASE_OFFSET:>3}   1 => {time_dtype} cannot hold timestamps"
        ));
        return Ok(());
    }
    for (offset, name) in [(TIMEBASE_OFFSET + 1, "t0"), (TIMEBASE_OFFSET + 9, "dt")] {
        let value = decode_scalar(region, time_dtype)?;
        field(lines, offset, 8, display_scalar(value), name);
    }

    let Some(scaling_dtype) = explain_dtype(region, lines, SCALING_OFFSET, "scaling")? else {
        return Ok(());
    };
    for (offset, name) in [(SCALING_OFFSET + 1, "offset"), (SCALING_OFFSET + 9, "scale")] {
        let value = decode_scalar(region, scaling_dtype)?;
        region.skip((SCALING_SLOT - scaling_dtype.width()) as u64)?;
        match value {
            Some(value) => field(lines, offset, 8, value, format!("scaling {name}")),
            None => field(lines, offset, 8, "-", format!("no scaling {name}")),
        }
    }

    let reserved = region.get_bytes(RESERVED_SIZE)?;
    let non_zero = reserved.iter().filter(|&&b| b != 0).count();
    field(
        lines,
        RESERVED_OFFSET,
        RESERVED_SIZE as u64,
        format!("{non_zero} non-zero bytes"),
        "reserved",
    );

    let Some(data_dtype) = explain_dtype(region, lines, DATA_OFFSET, "data")? else {
        return Ok(());
    };
    if !data_dtype.is_numeric() {
        lines.push(format!("{DATA_OFFSET:>3}   1 => data cannot be of type {data_dtype}"));
        return Ok(());
    }

    let count: i32 = region.get()?;
    if count < 0 {
        field(lines, DATA_OFFSET + 1, 4, count, "invalid negative sample count");
        return Ok(());
    }
    field(
        lines,
        DATA_OFFSET + 1,
        4,
        count,
        format!(
            "{count} samples, {} bytes in total",
            region_size(data_dtype.width(), count as usize)
        ),
    );
    Ok(())
}

fn explain_dtype(
    region: &mut Region<Cursor<&[u8]>>,
    lines: &mut Vec<String>,
    offset: u64,
    name: &str,
) -> Result<Option<DataType>> {
    let tag: u8 = region.get()?;
    match DataType::from_tag(tag) {
        Ok(dtype) => {
            field(lines, offset, 1, format!("{tag:#04x}"), format!("{name} dtype {dtype}"));
            Ok(Some(dtype))
        }
        Err(_) => {
            field(lines, offset, 1, format!("{tag:#04x}"), format!("unknown {name} dtype tag"));
            Ok(None)
        }
    }
}

fn display_scalar(value: Option<Scalar>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
