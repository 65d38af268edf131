//! Integration tests running the codec over memory-mapped files.
//!
//! The codec never opens or maps storage itself; these tests play the part
//! of the surrounding application and hand it a mapped region.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use bts_format::{
    DataType, Endian, Region, Samples, TimeKind, Timeseries, layout, read_header, read_index_range,
    region_size,
};
use memmap2::{Mmap, MmapMut, MmapOptions};
use std::fs::{File, OpenOptions};
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

#[allow(unsafe_code)]
fn map_for_writing(path: &Path, len: u64) -> MmapMut {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .expect("Should create file");
    file.set_len(len).expect("Should size file");

    unsafe { MmapOptions::new().map_mut(&file).expect("Should map file") }
}

#[allow(unsafe_code)]
fn map_for_reading(path: &Path) -> Mmap {
    let file = File::open(path).expect("Should open file");
    unsafe { MmapOptions::new().map(&file).expect("Should map file") }
}

/// 100 ms of a sawtooth sampled at 2 MHz with nanosecond timestamps,
/// starting 99 ms before trigger
fn sawtooth() -> (i64, i64, Vec<i16>) {
    let t0 = -99_000_000i64;
    let dt = 1_000_000_000 / 2_000_000;
    let values = (0..200_000i64)
        .map(|i| (i % i64::from(i16::MAX)) as i16)
        .collect();
    (t0, dt, values)
}

#[test]
fn test_write_and_read_whole_file() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("whole.bts");
    let (t0, dt, values) = sawtooth();

    let size = region_size(DataType::Short.width(), values.len());
    let mut mmap = map_for_writing(&path, size);
    layout::write(&mut Region::new(Cursor::new(&mut mmap[..])), t0, dt, &values).unwrap();
    mmap.flush().unwrap();
    drop(mmap);

    assert_eq!(std::fs::metadata(&path).unwrap().len(), size);

    let mmap = map_for_reading(&path);
    let mut decoded = vec![0i16; values.len()];
    let (t0_read, dt_read) =
        layout::read::<_, i64, i16>(&mut Region::new(Cursor::new(&mmap[..])), &mut decoded)
            .unwrap();
    assert_eq!((t0_read, dt_read), (t0, dt));
    assert!(decoded == values, "decoded samples differ");
}

#[test]
fn test_read_subset_from_file() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("range.bts");
    let (t0, dt, values) = sawtooth();

    let mut mmap = map_for_writing(&path, region_size(2, values.len()));
    layout::write(&mut Region::new(Cursor::new(&mut mmap[..])), t0, dt, &values).unwrap();
    mmap.flush().unwrap();
    drop(mmap);

    // 50 ms to 49.9 ms before trigger
    let from = -50_000_000i64;
    let upto = -49_900_000i64;
    let first = ((from - t0 + dt - 1) / dt) as usize;
    let last = ((upto - t0) / dt) as usize;

    let mmap = map_for_reading(&path);
    let subset =
        layout::read_range::<_, i64, i16>(&mut Region::new(Cursor::new(&mmap[..])), from, upto)
            .unwrap();
    assert_eq!(subset.len(), 201);
    assert_eq!(subset.len(), last - first + 1);
    assert_eq!(subset, values[first..=last]);

    // The dynamic path lands on the same samples
    let mut region = Region::new(Cursor::new(&mmap[..]));
    let header = read_header(&mut region).unwrap();
    assert_eq!(header.timebase.kind(), TimeKind::Long);
    assert_eq!(header.count, values.len());
    let samples = read_index_range(&mut region, &header, first, subset.len()).unwrap();
    assert_eq!(samples, Samples::Short(subset.clone()));
    let again = read_index_range(&mut region, &header, first, subset.len()).unwrap();
    assert_eq!(again, Samples::Short(subset));
}

#[test]
fn test_little_endian_file_parses() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("little.bts");

    let series = Timeseries::builder()
        .timebase(0.0f64, 1.0e-6)
        .scaling(-5.0f64, 10.0 / 65536.0)
        .samples((0..4096i16).map(|i| i * 8).collect::<Vec<_>>())
        .build()
        .unwrap();
    let data = series.build_with_endian(Endian::Little).unwrap();

    let mut mmap = map_for_writing(&path, data.len() as u64);
    mmap.copy_from_slice(&data);
    mmap.flush().unwrap();
    drop(mmap);

    let mmap = map_for_reading(&path);
    let parsed = Timeseries::parse(&mmap).unwrap();
    assert_eq!(parsed, series);
    assert_eq!(parsed.scaled()[0], -5.0);
}
