//! Conversion from raw register counts to calibrated physical units.
//!
//! [`convert`] is pure: it performs no I/O and returns bit-identical results for identical
//! inputs, so it can run on the acquisition side or on the consumer of the byte stream.

use core::f32::consts::PI;

use crate::config::{Config, ConfigError};
use crate::params::{AccelRange, GyroRange};
use crate::sample::RawSample;

/// Standard gravity used by the accelerometer scale, in m/s².
pub const STANDARD_GRAVITY: f32 = 9.807;

// Half of the 16-bit count span; full scale maps onto this many counts.
const COUNTS_PER_FULL_SCALE: f32 = 32767.5;

/// Remaps sensor axes onto a target frame.
///
/// Each row selects (and optionally negates) the raw X/Y/Z channel feeding one output axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisTransform {
    rows: [[i8; 3]; 3],
}

impl AxisTransform {
    /// Leaves the sensor frame unchanged.
    pub const IDENTITY: Self = Self {
        rows: [[1, 0, 0], [0, 1, 0], [0, 0, 1]],
    };

    /// Swaps X and Y and inverts Z, aligning the accel/gyro frame with the magnetometer.
    pub const MAGNETOMETER_ALIGNED: Self = Self {
        rows: [[0, 1, 0], [1, 0, 0], [0, 0, -1]],
    };

    /// Creates a transform from its X, Y and Z rows.
    pub fn new(tx: [i8; 3], ty: [i8; 3], tz: [i8; 3]) -> core::result::Result<Self, ConfigError> {
        let rows = [tx, ty, tz];
        if rows.iter().flatten().any(|entry| !(-1..=1).contains(entry)) {
            return Err(ConfigError::InvalidAxisTransform);
        }
        Ok(Self { rows })
    }

    /// Returns the X, Y and Z rows.
    pub const fn rows(&self) -> &[[i8; 3]; 3] {
        &self.rows
    }

    /// Applies the transform to a raw count triple, before any scaling.
    pub fn apply(&self, counts: [i16; 3]) -> [i32; 3] {
        self.rows.map(|row| {
            row.iter()
                .zip(counts)
                .map(|(&t, c)| i32::from(t) * i32::from(c))
                .sum::<i32>()
        })
    }
}

impl Default for AxisTransform {
    fn default() -> Self {
        Self::MAGNETOMETER_ALIGNED
    }
}

/// Scale, bias and range constants feeding [`convert`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationConstants {
    /// Accelerometer full-scale range the sensor was configured with.
    pub accel_range: AccelRange,
    /// Gyroscope full-scale range the sensor was configured with.
    pub gyro_range: GyroRange,
    /// Per-axis accelerometer scale factors (`axs`, `ays`, `azs`).
    pub accel_scale_factor: [f32; 3],
    /// Per-axis accelerometer bias in m/s² (`axb`, `ayb`, `azb`).
    pub accel_bias: [f32; 3],
    /// Per-axis gyroscope bias in rad/s (`gxb`, `gyb`, `gzb`).
    pub gyro_bias: [f32; 3],
    /// Temperature sensitivity in counts per °C.
    pub temp_scale: f32,
    /// Temperature offset in °C.
    pub temp_offset: f32,
}

impl CalibrationConstants {
    /// Unit scale factors and zero biases for the ranges selected by `config`.
    pub fn for_config(config: &Config) -> Self {
        Self {
            accel_range: config.accel_range,
            gyro_range: config.gyro_range,
            ..Self::default()
        }
    }

    /// m/s² per accelerometer count.
    pub fn accel_scale(&self) -> f32 {
        STANDARD_GRAVITY * self.accel_range.full_scale_g() / COUNTS_PER_FULL_SCALE
    }

    /// rad/s per gyroscope count.
    pub fn gyro_scale(&self) -> f32 {
        self.gyro_range.full_scale_dps() / COUNTS_PER_FULL_SCALE * PI / 180.0
    }

    /// Converts temperature counts to °C.
    ///
    /// The offset is subtracted before and added after scaling. This matches the constants
    /// (`333.87`, `21.0`) the consumers of this stream were calibrated against.
    pub fn temperature(&self, counts: i16) -> f32 {
        (f32::from(counts) - self.temp_offset) / self.temp_scale + self.temp_offset
    }
}

impl Default for CalibrationConstants {
    fn default() -> Self {
        Self {
            accel_range: AccelRange::G16,
            gyro_range: GyroRange::Dps2000,
            accel_scale_factor: [1.0; 3],
            accel_bias: [0.0; 3],
            gyro_bias: [0.0; 3],
            temp_scale: 333.87,
            temp_offset: 21.0,
        }
    }
}

/// A sample expressed in physical units. Derived on demand, never stored by the driver.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibratedSample {
    /// Die temperature in °C.
    pub temperature: f32,
    /// Acceleration X, Y, Z in m/s².
    pub accel: [f32; 3],
    /// Angular rate X, Y, Z in rad/s.
    pub gyro: [f32; 3],
}

impl CalibratedSample {
    /// Acceleration in units of standard gravity.
    pub fn accel_g(&self) -> [f32; 3] {
        self.accel.map(|a| a / STANDARD_GRAVITY)
    }

    /// Angular rate in degrees per second.
    pub fn gyro_dps(&self) -> [f32; 3] {
        self.gyro.map(f32::to_degrees)
    }
}

/// Converts a raw sample into physical units.
pub fn convert(
    raw: &RawSample,
    calibration: &CalibrationConstants,
    transform: &AxisTransform,
) -> CalibratedSample {
    let accel_scale = calibration.accel_scale();
    let gyro_scale = calibration.gyro_scale();

    let accel_counts = transform.apply(raw.accel_counts());
    let gyro_counts = transform.apply(raw.gyro_counts());

    let accel = core::array::from_fn(|axis| {
        (accel_counts[axis] as f32 * accel_scale - calibration.accel_bias[axis])
            * calibration.accel_scale_factor[axis]
    });
    let gyro = core::array::from_fn(|axis| {
        gyro_counts[axis] as f32 * gyro_scale - calibration.gyro_bias[axis]
    });

    CalibratedSample {
        temperature: calibration.temperature(raw.temp_counts()),
        accel,
        gyro,
    }
}
