//! Minimal GRIB2 message builder.
//!
//! Produces real edition-2 messages (grid template 3.0, product template 4.0,
//! simple packing 5.0, no bitmap) that the `grib` crate decodes, so the file
//! decoder can be exercised without downloading publisher data.
//!
//! Values are packed at 16 bits with no scaling, so whole-number values within
//! 65535 of the field minimum decode exactly.

use std::io;
use std::path::Path;

/// Builder for one GRIB2 message.
#[derive(Debug, Clone)]
pub struct Grib2Builder {
    discipline: u8,
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    // Grid, angles in microdegrees
    ni: u32,
    nj: u32,
    la1: i32,
    lo1: i32,
    di: u32,
    dj: u32,
    // Product
    category: u8,
    number: u8,
    surface_type: u8,
    surface_value: u32,
    forecast_hour: u32,
    values: Vec<f32>,
}

impl Grib2Builder {
    /// 2 metre temperature of the 2025-02-26 00 UTC run on a 3x2 grid:
    /// latitudes 46.0 and 45.5 (north to south), longitudes 10.0 to 11.0.
    pub fn icon_2i() -> Self {
        Self {
            discipline: 0,
            year: 2025,
            month: 2,
            day: 26,
            hour: 0,
            ni: 3,
            nj: 2,
            la1: 46_000_000,
            lo1: 10_000_000,
            di: 500_000,
            dj: 500_000,
            category: 0,
            number: 0,
            surface_type: 103,
            surface_value: 2,
            forecast_hour: 0,
            values: vec![280.0; 6],
        }
    }

    pub fn with_reference_time(mut self, year: u16, month: u8, day: u8, hour: u8) -> Self {
        self.year = year;
        self.month = month;
        self.day = day;
        self.hour = hour;
        self
    }

    /// Place the first (north-west) grid point, in degrees.
    pub fn with_origin(mut self, lat: f64, lon: f64) -> Self {
        self.la1 = (lat * 1e6).round() as i32;
        self.lo1 = (lon * 1e6).round() as i32;
        self
    }

    /// Parameter (category, number) of discipline 0.
    pub fn with_parameter(mut self, category: u8, number: u8) -> Self {
        self.category = category;
        self.number = number;
        self
    }

    /// Type and value of the first fixed surface.
    pub fn with_surface(mut self, surface_type: u8, value: u32) -> Self {
        self.surface_type = surface_type;
        self.surface_value = value;
        self
    }

    pub fn with_forecast_hour(mut self, hour: u32) -> Self {
        self.forecast_hour = hour;
        self
    }

    /// Values in scan order: rows north to south, columns west to east.
    pub fn with_values(mut self, values: Vec<f32>) -> Self {
        self.values = values;
        self
    }

    /// The complete message bytes.
    pub fn build(&self) -> Vec<u8> {
        let sections = [
            self.section1(),
            self.section3(),
            self.section4(),
            self.section5(),
            self.section6(),
            self.section7(),
        ];
        let length = 16 + sections.iter().map(Vec::len).sum::<usize>() + 4;

        let mut message = Vec::with_capacity(length);
        message.extend_from_slice(b"GRIB");
        message.extend_from_slice(&[0, 0]);
        message.push(self.discipline);
        message.push(2);
        message.extend_from_slice(&(length as u64).to_be_bytes());
        for section in &sections {
            message.extend_from_slice(section);
        }
        message.extend_from_slice(b"7777");
        message
    }

    fn section1(&self) -> Vec<u8> {
        let mut s = section_header(21, 1);
        s.extend_from_slice(&80u16.to_be_bytes()); // Rome
        s.extend_from_slice(&0u16.to_be_bytes());
        s.extend_from_slice(&[2, 0, 1]);
        s.extend_from_slice(&self.year.to_be_bytes());
        s.extend_from_slice(&[self.month, self.day, self.hour, 0, 0]);
        s.extend_from_slice(&[0, 1]);
        s
    }

    fn section3(&self) -> Vec<u8> {
        let mut s = section_header(72, 3);
        s.push(0);
        s.extend_from_slice(&(self.ni * self.nj).to_be_bytes());
        s.extend_from_slice(&[0, 0]);
        s.extend_from_slice(&0u16.to_be_bytes());

        // Template 3.0, spherical earth
        s.extend_from_slice(&[6, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        s.extend_from_slice(&self.ni.to_be_bytes());
        s.extend_from_slice(&self.nj.to_be_bytes());
        s.extend_from_slice(&0u32.to_be_bytes());
        s.extend_from_slice(&u32::MAX.to_be_bytes());
        let la2 = self.la1 - (self.dj * (self.nj - 1)) as i32;
        let lo2 = self.lo1 + (self.di * (self.ni - 1)) as i32;
        s.extend_from_slice(&sign_magnitude(self.la1));
        s.extend_from_slice(&sign_magnitude(self.lo1));
        s.push(0x30);
        s.extend_from_slice(&sign_magnitude(la2));
        s.extend_from_slice(&sign_magnitude(lo2));
        s.extend_from_slice(&self.di.to_be_bytes());
        s.extend_from_slice(&self.dj.to_be_bytes());
        // +i, -j, rows consecutive
        s.push(0);
        s
    }

    fn section4(&self) -> Vec<u8> {
        let mut s = section_header(34, 4);
        s.extend_from_slice(&0u16.to_be_bytes());
        s.extend_from_slice(&0u16.to_be_bytes());
        s.extend_from_slice(&[self.category, self.number, 2, 0, 0]);
        s.extend_from_slice(&[0, 0, 0]);
        // Forecast time in hours
        s.push(1);
        s.extend_from_slice(&self.forecast_hour.to_be_bytes());
        s.extend_from_slice(&[self.surface_type, 0]);
        s.extend_from_slice(&self.surface_value.to_be_bytes());
        s.extend_from_slice(&[255, 0, 0, 0, 0, 0]);
        s
    }

    fn section5(&self) -> Vec<u8> {
        let mut s = section_header(21, 5);
        s.extend_from_slice(&(self.ni * self.nj).to_be_bytes());
        s.extend_from_slice(&0u16.to_be_bytes());
        s.extend_from_slice(&self.reference_value().to_be_bytes());
        // Binary and decimal scale factors
        s.extend_from_slice(&[0, 0, 0, 0]);
        s.extend_from_slice(&[16, 0]);
        s
    }

    fn section6(&self) -> Vec<u8> {
        let mut s = section_header(6, 6);
        s.push(255);
        s
    }

    fn section7(&self) -> Vec<u8> {
        let reference = self.reference_value();
        let mut s = section_header(5 + 2 * self.values.len() as u32, 7);
        for &value in &self.values {
            let packed = (value - reference).round().clamp(0.0, u16::MAX as f32) as u16;
            s.extend_from_slice(&packed.to_be_bytes());
        }
        s
    }

    fn reference_value(&self) -> f32 {
        self.values.iter().copied().fold(f32::INFINITY, f32::min)
    }
}

/// Concatenate messages into one file, as the publisher does.
pub fn write_grib_file(path: &Path, messages: &[Vec<u8>]) -> io::Result<()> {
    std::fs::write(path, messages.concat())
}

fn section_header(length: u32, number: u8) -> Vec<u8> {
    let mut s = Vec::with_capacity(length as usize);
    s.extend_from_slice(&length.to_be_bytes());
    s.push(number);
    s
}

/// GRIB2 encodes negative integers as sign and magnitude, not two's complement.
fn sign_magnitude(value: i32) -> [u8; 4] {
    let magnitude = value.unsigned_abs() & 0x7fff_ffff;
    let raw = if value < 0 {
        magnitude | 0x8000_0000
    } else {
        magnitude
    };
    raw.to_be_bytes()
}
