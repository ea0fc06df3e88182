//! Configuration primitives for the MPU9250 driver.

use crate::params::{AccelRange, DlpfBandwidth, GyroRange, SensorEnable};

/// User-facing bring-up configuration for the MPU9250 sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Accelerometer full-scale range.
    pub accel_range: AccelRange,
    /// Gyroscope full-scale range.
    pub gyro_range: GyroRange,
    /// Axes left powered after bring-up.
    pub enable: SensorEnable,
    /// Digital low-pass filter bandwidth. `None` leaves the power-on filter setting untouched.
    pub bandwidth: Option<DlpfBandwidth>,
    /// Sample rate divider (`SMPLRT_DIV`). `None` leaves the register untouched.
    pub sample_rate_divider: Option<u8>,
}

impl Config {
    /// Begins building a [`Config`] using the builder pattern.
    pub fn new() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Checks whether this configuration can produce samples.
    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        if !self.enable.any() {
            return Err(ConfigError::DisabledAllAxes);
        }

        Ok(())
    }
}

/// Builder for [`Config`] allowing piecemeal construction.
#[derive(Debug, Clone, Copy)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a new builder seeded with [`Config::default()`].
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Overrides the accelerometer full-scale range.
    pub fn accel_range(mut self, range: AccelRange) -> Self {
        self.config.accel_range = range;
        self
    }

    /// Overrides the gyroscope full-scale range.
    pub fn gyro_range(mut self, range: GyroRange) -> Self {
        self.config.gyro_range = range;
        self
    }

    /// Selects which axes stay powered.
    pub fn enable(mut self, enable: SensorEnable) -> Self {
        self.config.enable = enable;
        self
    }

    /// Programs the digital low-pass filter during bring-up.
    pub fn bandwidth(mut self, bandwidth: DlpfBandwidth) -> Self {
        self.config.bandwidth = Some(bandwidth);
        self
    }

    /// Programs the sample rate divider during bring-up.
    pub fn sample_rate_divider(mut self, divider: u8) -> Self {
        self.config.sample_rate_divider = Some(divider);
        self
    }

    /// Finalizes the builder and returns the [`Config`].
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            accel_range: AccelRange::G16,
            gyro_range: GyroRange::Dps2000,
            enable: SensorEnable::ALL,
            bandwidth: None,
            sample_rate_divider: None,
        }
    }
}

/// Validation errors generated while verifying configuration values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Every accelerometer and gyroscope axis is disabled.
    DisabledAllAxes,
    /// An axis transform entry lies outside `{-1, 0, 1}`.
    InvalidAxisTransform,
}
