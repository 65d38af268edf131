//! Region assembly and the typed read paths
//!
//! A region is a fixed 64-byte header followed by the sample payload:
//!
//! ```text
//! 0   2   endianness marker (int16 = 1)
//! 2   17  timebase block (dtype, t0, dt)
//! 19  17  scaling block (dtype, offset slot, scale slot)
//! 36  23  reserved, zero
//! 59  1   data dtype
//! 60  4   int32 sample count
//! 64  ..  samples
//! ```
//!
//! Writers emit every block in order. Readers negotiate byte order first,
//! since every later multi-byte field depends on it.

use crate::dtype::Sample;
use crate::endian::{MARKER_SIZE, read_marker, write_marker};
use crate::error::{Result, TimeseriesError};
use crate::interval::resolve_window;
use crate::region::Region;
use crate::scaling::{SCALING_SIZE, skip_scaling, write_scaling, write_scaling_disabled};
use crate::timebase::{TIMEBASE_SIZE, TimeValue, read_timebase, write_timebase};
use crate::values::{COUNT_PREFIX_SIZE, ensure_span, read_count, read_values, write_values};
use std::io::{Read, Seek, Write};
use tracing::trace;

/// Fixed header size; the payload starts here
pub const HEADER_SIZE: u64 = 64;

/// Length of the zeroed reserved block
pub const RESERVED_SIZE: usize = 23;

/// Offset of the timebase block
pub const TIMEBASE_OFFSET: u64 = MARKER_SIZE;

/// Offset of the scaling block
pub const SCALING_OFFSET: u64 = TIMEBASE_OFFSET + TIMEBASE_SIZE;

/// Offset of the reserved block
pub const RESERVED_OFFSET: u64 = SCALING_OFFSET + SCALING_SIZE;

/// Offset of the data dtype tag
pub const DATA_OFFSET: u64 = RESERVED_OFFSET + RESERVED_SIZE as u64;

const _: () = assert!(DATA_OFFSET + COUNT_PREFIX_SIZE == HEADER_SIZE);

/// Total bytes of a region holding `count` samples of `width` bytes each
pub const fn region_size(width: usize, count: usize) -> u64 {
    HEADER_SIZE + (width * count) as u64
}

/// Write the zeroed reserved block
pub fn write_reserved<S: Write + Seek>(region: &mut Region<S>) -> Result<()> {
    region.framed(RESERVED_SIZE as u64, |r| r.put_zeros(RESERVED_SIZE))
}

/// Advance past the reserved block
pub fn skip_reserved<S: Seek>(region: &mut Region<S>) -> Result<()> {
    region.skip(RESERVED_SIZE as u64)
}

/// Write a complete region without scaling
pub fn write<S, T, V>(region: &mut Region<S>, t0: T, dt: T, values: &[V]) -> Result<()>
where
    S: Write + Seek,
    T: TimeValue,
    V: Sample,
{
    region.framed(region_size(V::DTYPE.width(), values.len()), |r| {
        write_marker(r)?;
        write_timebase(r, t0, dt)?;
        write_scaling_disabled(r)?;
        write_reserved(r)?;
        write_values(r, values)
    })
}

/// Write a complete region with linear scaling `raw * scale + offset`
pub fn write_with_scaling<S, T, V, C>(
    region: &mut Region<S>,
    t0: T,
    dt: T,
    values: &[V],
    offset: C,
    scale: C,
) -> Result<()>
where
    S: Write + Seek,
    T: TimeValue,
    V: Sample,
    C: Sample,
{
    region.framed(region_size(V::DTYPE.width(), values.len()), |r| {
        write_marker(r)?;
        write_timebase(r, t0, dt)?;
        write_scaling(r, offset, scale)?;
        write_reserved(r)?;
        write_values(r, values)
    })
}

fn read_preamble<S, T>(region: &mut Region<S>) -> Result<(T, T)>
where
    S: Read + Seek,
    T: TimeValue,
{
    read_marker(region)?;
    let timebase = read_timebase(region)?;
    skip_scaling(region)?;
    skip_reserved(region)?;
    Ok(timebase)
}

/// Read a complete region into `destination`, returning `(t0, dt)`
///
/// `destination` must hold exactly as many samples as the region records.
pub fn read<S, T, V>(region: &mut Region<S>, destination: &mut [V]) -> Result<(T, T)>
where
    S: Read + Seek,
    T: TimeValue,
    V: Sample,
{
    let timebase = read_preamble(region)?;
    let count = read_count::<_, V>(region)?;
    if destination.len() != count {
        return Err(TimeseriesError::SizeMismatch {
            expected: count,
            actual: destination.len(),
        });
    }
    read_values(region, destination, 0)?;
    Ok(timebase)
}

/// Read the samples whose timestamps lie in `[from, upto]`
///
/// The window is cut to the recorded span. A window that contains no sample
/// yields an empty vector.
pub fn read_range<S, T, V>(region: &mut Region<S>, from: T, upto: T) -> Result<Vec<V>>
where
    S: Read + Seek,
    T: TimeValue,
    V: Sample,
{
    let (t0, dt) = read_preamble(region)?;
    let count = read_count::<_, V>(region)?;
    let interval = resolve_window(t0, dt, from, upto, count)?;
    let Some(range) = interval.as_range() else {
        trace!(count, "window holds no samples");
        return Ok(Vec::new());
    };

    trace!(first = range.start, len = range.len(), count, "reading sample range");
    ensure_span(region, V::DTYPE, range.start, range.len())?;
    let mut values = vec![V::default(); range.len()];
    read_values(region, &mut values, range.start)?;
    Ok(values)
}
