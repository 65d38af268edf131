//! Byte-order negotiation through the leading 16-bit marker
//!
//! Every region opens with the int16 value 1 written in the writer's byte
//! order. A reader using the other order sees 256 instead and flips the
//! region's byte order before decoding anything else.

use crate::error::{Result, TimeseriesError};
use crate::region::Region;
use std::io::{Read, Seek, Write};
use tracing::debug;

/// Marker value as written
pub const ENDIANNESS_MARKER: i16 = 1;

/// Marker value as seen through the opposite byte order
pub const SWAPPED_MARKER: i16 = 256;

/// Encoded size of the marker
pub const MARKER_SIZE: u64 = 2;

/// Write the endianness marker in the region's current byte order
pub fn write_marker<S: Write + Seek>(region: &mut Region<S>) -> Result<()> {
    region.framed(MARKER_SIZE, |r| r.put(&ENDIANNESS_MARKER))
}

/// Read the endianness marker, correcting the region's byte order if needed
///
/// Returns `true` when the byte order was flipped.
pub fn read_marker<S: Read + Seek>(region: &mut Region<S>) -> Result<bool> {
    let marker: i16 = region.framed(MARKER_SIZE, |r| r.get())?;
    match marker {
        ENDIANNESS_MARKER => Ok(false),
        SWAPPED_MARKER => {
            let endian = region.flip_endian();
            debug!(?endian, "endianness marker swapped, flipped byte order");
            Ok(true)
        }
        other => Err(TimeseriesError::CorruptHeader(other)),
    }
}
