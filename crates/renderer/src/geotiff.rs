//! Multiband GeoTIFF encoding.
//!
//! Layout of the written file:
//! - one IFD, `PlanarConfiguration = 2`, one float32 strip per band
//! - `ModelPixelScale` / `ModelTiepoint` from the geotransform
//! - a GeoKey directory declaring geographic EPSG:4326
//! - `GDAL_NODATA` and a `GDAL_METADATA` XML document carrying the
//!   dataset items and the per-band timestamps

use std::fs::{self, File};
use std::path::Path;

use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;
use tracing::debug;

use crate::artifact::{RasterArtifact, NODATA};
use crate::error::{RenderError, Result};
use crate::RasterWriter;

/// Private TIFF tags understood by GDAL.
pub mod geo_tags {
    pub const MODEL_PIXEL_SCALE: u16 = 33550;
    pub const MODEL_TIEPOINT: u16 = 33922;
    pub const GEO_KEY_DIRECTORY: u16 = 34735;
    pub const GDAL_METADATA: u16 = 42112;
    pub const GDAL_NODATA: u16 = 42113;
    pub const EXTRA_SAMPLES: u16 = 338;
}

/// GeoKey directory for a geographic WGS84 raster with pixel-is-area cells.
const GEO_KEYS_EPSG_4326: [u16; 16] = [
    1, 1, 0, 3, // version, revision, minor, key count
    1024, 0, 1, 2, // GTModelType = geographic
    1025, 0, 1, 1, // GTRasterType = pixel is area
    2048, 0, 1, 4326, // GeographicType = WGS84
];

/// Writes [`RasterArtifact`]s as GeoTIFF files.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoTiffWriter;

impl GeoTiffWriter {
    pub fn new() -> Self {
        Self
    }
}

impl RasterWriter for GeoTiffWriter {
    fn write(&self, artifact: &RasterArtifact, path: &Path) -> Result<()> {
        let expected = artifact.width * artifact.height;
        for (band, values) in artifact.bands.iter().enumerate() {
            if values.len() != expected {
                return Err(RenderError::BandSize {
                    band,
                    expected,
                    actual: values.len(),
                });
            }
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        let mut encoder = TiffEncoder::new(file)?;
        let mut dir = encoder.new_directory()?;

        let bands = artifact.band_count();
        let mut offsets = Vec::with_capacity(bands);
        for values in &artifact.bands {
            let offset = dir.write_data(values.as_slice())?;
            offsets.push(u32::try_from(offset).map_err(|_| {
                RenderError::Tiff(format!("strip offset {} exceeds classic TIFF range", offset))
            })?);
        }
        let strip_bytes = u32::try_from(expected * std::mem::size_of::<f32>())
            .map_err(|_| RenderError::Tiff("band larger than 4 GiB".to_string()))?;
        let byte_counts = vec![strip_bytes; bands];

        dir.write_tag(Tag::ImageWidth, artifact.width as u32)?;
        dir.write_tag(Tag::ImageLength, artifact.height as u32)?;
        dir.write_tag(Tag::BitsPerSample, vec![32u16; bands].as_slice())?;
        dir.write_tag(Tag::Compression, 1u16)?;
        dir.write_tag(Tag::PhotometricInterpretation, 1u16)?;
        dir.write_tag(Tag::StripOffsets, offsets.as_slice())?;
        dir.write_tag(Tag::SamplesPerPixel, bands as u16)?;
        dir.write_tag(Tag::RowsPerStrip, artifact.height as u32)?;
        dir.write_tag(Tag::StripByteCounts, byte_counts.as_slice())?;
        dir.write_tag(Tag::PlanarConfiguration, 2u16)?;
        if bands > 1 {
            dir.write_tag(
                Tag::Unknown(geo_tags::EXTRA_SAMPLES),
                vec![0u16; bands - 1].as_slice(),
            )?;
        }
        dir.write_tag(Tag::SampleFormat, vec![3u16; bands].as_slice())?;

        let gt = &artifact.geotransform;
        dir.write_tag(
            Tag::Unknown(geo_tags::MODEL_PIXEL_SCALE),
            &[gt.pixel_width, gt.pixel_height, 0.0][..],
        )?;
        dir.write_tag(
            Tag::Unknown(geo_tags::MODEL_TIEPOINT),
            &[0.0, 0.0, 0.0, gt.x_min, gt.y_max, 0.0][..],
        )?;
        dir.write_tag(Tag::Unknown(geo_tags::GEO_KEY_DIRECTORY), &GEO_KEYS_EPSG_4326[..])?;
        dir.write_tag(
            Tag::Unknown(geo_tags::GDAL_METADATA),
            gdal_metadata(artifact).as_str(),
        )?;
        dir.write_tag(
            Tag::Unknown(geo_tags::GDAL_NODATA),
            format!("{}", NODATA).as_str(),
        )?;

        dir.finish()?;

        debug!(
            path = %path.display(),
            bands = bands,
            width = artifact.width,
            height = artifact.height,
            "Wrote GeoTIFF"
        );
        Ok(())
    }
}

/// `GDAL_METADATA` document: dataset items, then a description and a
/// timestamp item for every band.
pub fn gdal_metadata(artifact: &RasterArtifact) -> String {
    let mut xml = String::from("<GDALMetadata>");
    for (name, value) in &artifact.metadata {
        xml.push_str(&format!(
            "<Item name=\"{}\">{}</Item>",
            escape_xml(name),
            escape_xml(value)
        ));
    }
    for (band, timestamp) in artifact.band_timestamps.iter().enumerate() {
        let timestamp = escape_xml(timestamp);
        xml.push_str(&format!(
            "<Item name=\"DESCRIPTION\" sample=\"{band}\" role=\"description\">{timestamp}</Item>\
             <Item name=\"band_name\" sample=\"{band}\">{timestamp}</Item>\
             <Item name=\"timestamp\" sample=\"{band}\">{timestamp}</Item>"
        ));
    }
    xml.push_str("</GDALMetadata>");
    xml
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
