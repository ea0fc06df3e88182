//! Strongly typed parameter enumerations for the MPU9250 driver.
//!
//! These enums map directly to register field encodings and are used across
//! [`Config`](crate::config::Config) and the calibration constants. Prefer these
//! types over raw integers to keep configuration values valid and explicit.
//!
//! # Examples
//!
//! ```rust
//! use mpu9250_stream::params::{AccelRange, GyroRange};
//!
//! assert_eq!(AccelRange::G16.full_scale_g(), 16.0);
//! assert_eq!(GyroRange::Dps2000.full_scale_dps(), 2000.0);
//! ```

use modular_bitfield::prelude::Specifier;

/// Accelerometer full-scale range (`ACCEL_CONFIG.ACCEL_FS_SEL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum AccelRange {
    /// ±2 g.
    G2 = 0b00,
    /// ±4 g.
    G4 = 0b01,
    /// ±8 g.
    G8 = 0b10,
    /// ±16 g.
    G16 = 0b11,
}

impl AccelRange {
    /// Returns the full-scale range in g.
    pub const fn full_scale_g(self) -> f32 {
        match self {
            Self::G2 => 2.0,
            Self::G4 => 4.0,
            Self::G8 => 8.0,
            Self::G16 => 16.0,
        }
    }
}

impl Default for AccelRange {
    fn default() -> Self {
        Self::G16
    }
}

/// Gyroscope full-scale range (`GYRO_CONFIG.GYRO_FS_SEL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum GyroRange {
    /// ±250 °/s.
    Dps250 = 0b00,
    /// ±500 °/s.
    Dps500 = 0b01,
    /// ±1000 °/s.
    Dps1000 = 0b10,
    /// ±2000 °/s.
    Dps2000 = 0b11,
}

impl GyroRange {
    /// Returns the full-scale range in degrees per second.
    pub const fn full_scale_dps(self) -> f32 {
        match self {
            Self::Dps250 => 250.0,
            Self::Dps500 => 500.0,
            Self::Dps1000 => 1_000.0,
            Self::Dps2000 => 2_000.0,
        }
    }
}

impl Default for GyroRange {
    fn default() -> Self {
        Self::Dps2000
    }
}

/// Digital low-pass filter bandwidth shared by the gyro (`CONFIG.DLPF_CFG`)
/// and accelerometer (`ACCEL_CONFIG2.A_DLPFCFG`) paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DlpfBandwidth {
    /// 184 Hz.
    Hz184,
    /// 92 Hz.
    Hz92,
    /// 41 Hz.
    Hz41,
    /// 20 Hz.
    Hz20,
    /// 10 Hz.
    Hz10,
    /// 5 Hz.
    Hz5,
}

impl DlpfBandwidth {
    /// Returns the 3-bit filter code programmed into both DLPF fields.
    pub const fn code(self) -> u8 {
        match self {
            Self::Hz184 => 1,
            Self::Hz92 => 2,
            Self::Hz41 => 3,
            Self::Hz20 => 4,
            Self::Hz10 => 5,
            Self::Hz5 => 6,
        }
    }

    /// Returns the nominal bandwidth in hertz.
    pub const fn hz(self) -> u32 {
        match self {
            Self::Hz184 => 184,
            Self::Hz92 => 92,
            Self::Hz41 => 41,
            Self::Hz20 => 20,
            Self::Hz10 => 10,
            Self::Hz5 => 5,
        }
    }
}

/// Per-axis enable mask written to `PWR_MGMT_2`.
///
/// The register uses disable bits; this type stores the positive sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorEnable {
    /// Accelerometer X, Y, Z enabled.
    pub accel: [bool; 3],
    /// Gyroscope X, Y, Z enabled.
    pub gyro: [bool; 3],
}

impl SensorEnable {
    /// Every accelerometer and gyroscope axis enabled.
    pub const ALL: Self = Self {
        accel: [true; 3],
        gyro: [true; 3],
    };

    /// Returns `true` when at least one axis is enabled.
    pub fn any(&self) -> bool {
        self.accel.iter().chain(self.gyro.iter()).any(|enabled| *enabled)
    }
}

impl Default for SensorEnable {
    fn default() -> Self {
        Self::ALL
    }
}
