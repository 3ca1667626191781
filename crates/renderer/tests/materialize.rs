use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{Duration, TimeZone, Utc};
use grid_processor::TimeSeries;
use icon_common::Variable;
use renderer::{materialize, GeoTiffWriter, RasterArtifact, RasterWriter, Result};

/// Minimal little-endian classic TIFF reader for the first IFD.
struct Ifd {
    bytes: Vec<u8>,
    entries: HashMap<u16, (u16, u32, u32)>,
}

impl Ifd {
    fn read(path: &Path) -> Self {
        let bytes = std::fs::read(path).unwrap();
        assert_eq!(&bytes[..4], b"II*\0", "expected little-endian TIFF");
        let ifd = u32_at(&bytes, 4) as usize;
        let count = u16_at(&bytes, ifd) as usize;
        let mut entries = HashMap::new();
        for i in 0..count {
            let at = ifd + 2 + i * 12;
            entries.insert(
                u16_at(&bytes, at),
                (u16_at(&bytes, at + 2), u32_at(&bytes, at + 4), at as u32 + 8),
            );
        }
        Self { bytes, entries }
    }

    fn raw(&self, tag: u16) -> &[u8] {
        let (kind, count, field) = self.entries[&tag];
        let size = match kind {
            1 | 2 => 1,
            3 => 2,
            4 => 4,
            12 => 8,
            other => panic!("unexpected field type {}", other),
        } * count as usize;
        let start = if size <= 4 {
            field as usize
        } else {
            u32_at(&self.bytes, field as usize) as usize
        };
        &self.bytes[start..start + size]
    }

    fn ascii(&self, tag: u16) -> String {
        String::from_utf8_lossy(self.raw(tag))
            .trim_end_matches('\0')
            .to_string()
    }

    fn shorts(&self, tag: u16) -> Vec<u16> {
        self.raw(tag).chunks(2).map(|c| u16_at(c, 0)).collect()
    }

    fn longs(&self, tag: u16) -> Vec<u32> {
        let (kind, _, _) = self.entries[&tag];
        if kind == 3 {
            return self.shorts(tag).into_iter().map(u32::from).collect();
        }
        self.raw(tag).chunks(4).map(|c| u32_at(c, 0)).collect()
    }

    fn doubles(&self, tag: u16) -> Vec<f64> {
        self.raw(tag)
            .chunks(8)
            .map(|c| f64::from_le_bytes(c.try_into().unwrap()))
            .collect()
    }

    fn band(&self, index: usize) -> Vec<f32> {
        let offset = self.longs(273)[index] as usize;
        let len = self.longs(279)[index] as usize;
        self.bytes[offset..offset + len]
            .chunks(4)
            .map(|c| f32::from_le_bytes(c.try_into().unwrap()))
            .collect()
    }
}

fn u16_at(b: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([b[at], b[at + 1]])
}

fn u32_at(b: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

/// Seven hourly precipitation steps on a 2x3 grid, lat ascending.
fn precipitation_window() -> TimeSeries {
    let start = Utc.with_ymd_and_hms(2025, 2, 26, 0, 0, 0).unwrap();
    let time = (0..7).map(|h| start + Duration::hours(h)).collect();
    let mut data = Vec::new();
    for t in 0..7 {
        for y in 0..2 {
            for x in 0..3 {
                data.push(t as f32 + y as f32 * 10.0 + x as f32 * 0.1);
            }
        }
    }
    data[0] = f32::NAN;
    TimeSeries::new(
        Variable::TotalPrecipitation,
        time,
        vec![44.0, 44.5],
        vec![11.0, 11.5, 12.0],
        data,
    )
    .unwrap()
}

#[test]
fn test_materialize_default_path_and_bands() {
    let workspace = tempfile::tempdir().unwrap();
    let series = precipitation_window();

    let path = materialize(&GeoTiffWriter::new(), &series, None, workspace.path()).unwrap();
    assert_eq!(
        path,
        workspace
            .path()
            .join("ICON_2I_SURFACE_PRESSURE_LEVELS")
            .join("total_precipitation")
            .join("ICON_2I_SURFACE_PRESSURE_LEVELS__total_precipitation__2025-02-26T00:00:00.tif")
    );

    let ifd = Ifd::read(&path);
    assert_eq!(ifd.longs(256), vec![3]); // width
    assert_eq!(ifd.longs(257), vec![2]); // height
    assert_eq!(ifd.shorts(277), vec![7]); // bands
    assert_eq!(ifd.shorts(284), vec![2]); // band separate
    assert_eq!(ifd.shorts(339), vec![3; 7]); // float samples
    assert_eq!(ifd.ascii(42113), "-9999");

    let tiepoint = ifd.doubles(33922);
    assert_eq!(&tiepoint[3..5], &[11.0, 44.5]);
    let scale = ifd.doubles(33550);
    assert!((scale[0] - 1.0 / 3.0).abs() < 1e-9);
    assert!((scale[1] - 0.25).abs() < 1e-9);
    assert!(ifd.shorts(34735).contains(&4326));

    // North row first, missing value written as nodata
    let first = ifd.band(0);
    assert_eq!(first.len(), 6);
    assert!((first[0] - 10.0).abs() < 1e-6);
    assert_eq!(first[3], -9999.0);
    let last = ifd.band(6);
    assert!((last[5] - 6.2).abs() < 1e-5);
}

#[test]
fn test_band_timestamps_match_series_time() {
    let workspace = tempfile::tempdir().unwrap();
    let series = precipitation_window();
    let out = workspace.path().join("custom/out.tif");

    let path = materialize(&GeoTiffWriter::new(), &series, Some(&out), workspace.path()).unwrap();
    assert_eq!(path, out);

    let xml = Ifd::read(&path).ascii(42112);
    let mut timestamps = Vec::new();
    for band in 0..7 {
        let open = format!("<Item name=\"timestamp\" sample=\"{}\">", band);
        let start = xml.find(&open).unwrap() + open.len();
        let end = start + xml[start..].find("</Item>").unwrap();
        timestamps.push(xml[start..end].to_string());
    }
    let expected: Vec<String> = (0..7)
        .map(|h| format!("2025-02-26T{:02}:00:00", h))
        .collect();
    assert_eq!(timestamps, expected);
    assert!(xml.contains("<Item name=\"type\"></Item>"));
    assert!(xml.contains("<Item name=\"unit\"></Item>"));
}

#[derive(Default)]
struct RecordingWriter {
    written: Mutex<Vec<(PathBuf, usize)>>,
}

impl RasterWriter for RecordingWriter {
    fn write(&self, artifact: &RasterArtifact, path: &Path) -> Result<()> {
        self.written
            .lock()
            .unwrap()
            .push((path.to_path_buf(), artifact.band_count()));
        Ok(())
    }
}

#[test]
fn test_materialize_through_any_writer() {
    let writer = RecordingWriter::default();
    let series = precipitation_window();
    let path = materialize(&writer, &series, None, Path::new("/ws")).unwrap();

    let written = writer.written.lock().unwrap();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0], (path, 7));
}

#[test]
fn test_empty_window_writes_nothing() {
    let writer = RecordingWriter::default();
    let series = TimeSeries::empty(Variable::Temperature, vec![44.0], vec![11.0]);
    assert!(materialize(&writer, &series, None, Path::new("/ws")).is_err());
    assert!(writer.written.lock().unwrap().is_empty());
}
