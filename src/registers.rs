//! Register map definitions for the MPU9250 inertial sensor.
#![allow(unused_parens)]

use modular_bitfield::prelude::*;

use crate::params::{AccelRange, DlpfBandwidth, GyroRange, SensorEnable};

/// Register address of `SMPLRT_DIV`.
pub const REG_SMPLRT_DIV: u8 = 0x19;
/// Register address of `CONFIG`.
pub const REG_CONFIG: u8 = 0x1A;
/// Register address of `GYRO_CONFIG`.
pub const REG_GYRO_CONFIG: u8 = 0x1B;
/// Register address of `ACCEL_CONFIG`.
pub const REG_ACCEL_CONFIG: u8 = 0x1C;
/// Register address of `ACCEL_CONFIG2`.
pub const REG_ACCEL_CONFIG2: u8 = 0x1D;
/// Register address of `ACCEL_XOUT_H`, first of six accelerometer output bytes.
pub const REG_ACCEL_XOUT_H: u8 = 0x3B;
/// Register address of `TEMP_OUT_H`, first of two temperature output bytes.
pub const REG_TEMP_OUT_H: u8 = 0x41;
/// Register address of `GYRO_XOUT_H`, first of six gyroscope output bytes.
pub const REG_GYRO_XOUT_H: u8 = 0x43;
/// Register address of `PWR_MGMT_2`.
pub const REG_PWR_MGMT_2: u8 = 0x6C;
/// Register address of `WHO_AM_I`.
pub const REG_WHO_AM_I: u8 = 0x75;

/// `WHO_AM_I` value reported by the MPU9250.
pub const WHO_AM_I_MPU9250: u8 = 0x71;
/// `WHO_AM_I` value reported by the MPU9255.
pub const WHO_AM_I_MPU9255: u8 = 0x73;

/// Number of bytes read from `TEMP_OUT_H`.
pub const TEMP_LEN: usize = 2;
/// Number of bytes read from `ACCEL_XOUT_H`.
pub const ACCEL_LEN: usize = 6;
/// Number of bytes read from `GYRO_XOUT_H`.
pub const GYRO_LEN: usize = 6;

/// Size of a configuration write: register address followed by one value byte.
pub const CONFIG_WRITE_LEN: usize = 2;

/// Configuration register value types that know their own address.
pub trait Register {
    /// Register address as documented in the register map.
    const ADDRESS: u8;
}

/// Bitfield representation of the `CONFIG` register (address `0x1A`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Configuration {
    // Gyro and temperature DLPF selection (bits 2:0).
    pub dlpf_cfg: B3,
    // FSYNC pin sampling location (bits 5:3).
    pub ext_sync_set: B3,
    // Drop samples instead of overwriting when the FIFO is full (bit 6).
    pub fifo_mode: bool,
    #[skip]
    __: B1,
}

/// Bitfield representation of the `GYRO_CONFIG` register (address `0x1B`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GyroConfig {
    // DLPF bypass selection, inverted sense (bits 1:0).
    pub fchoice_b: B2,
    #[skip]
    __: B1,
    // Full-scale range (bits 4:3).
    pub fs_sel: GyroRange,
    // Z-axis self-test (bit 5).
    pub z_self_test: bool,
    // Y-axis self-test (bit 6).
    pub y_self_test: bool,
    // X-axis self-test (bit 7).
    pub x_self_test: bool,
}

/// Bitfield representation of the `ACCEL_CONFIG` register (address `0x1C`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccelConfig {
    #[skip]
    __: B3,
    // Full-scale range (bits 4:3).
    pub fs_sel: AccelRange,
    // Z-axis self-test (bit 5).
    pub z_self_test: bool,
    // Y-axis self-test (bit 6).
    pub y_self_test: bool,
    // X-axis self-test (bit 7).
    pub x_self_test: bool,
}

/// Bitfield representation of the `ACCEL_CONFIG2` register (address `0x1D`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccelConfig2 {
    // Accelerometer DLPF selection (bits 2:0).
    pub a_dlpf_cfg: B3,
    // DLPF bypass, inverted sense (bit 3).
    pub accel_fchoice_b: bool,
    #[skip]
    __: B4,
}

/// Bitfield representation of the `PWR_MGMT_2` register (address `0x6C`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerManagement2 {
    // Gyro Z disabled (bit 0).
    pub disable_zg: bool,
    // Gyro Y disabled (bit 1).
    pub disable_yg: bool,
    // Gyro X disabled (bit 2).
    pub disable_xg: bool,
    // Accel Z disabled (bit 3).
    pub disable_za: bool,
    // Accel Y disabled (bit 4).
    pub disable_ya: bool,
    // Accel X disabled (bit 5).
    pub disable_xa: bool,
    #[skip]
    __: B2,
}

macro_rules! impl_u8_conversions {
    ($($reg:ty),* $(,)?) => {
        $(
            impl From<u8> for $reg {
                fn from(value: u8) -> Self {
                    Self::from_bytes([value])
                }
            }

            impl From<$reg> for u8 {
                fn from(value: $reg) -> Self {
                    value.into_bytes()[0]
                }
            }
        )*
    };
}

impl_u8_conversions!(Configuration, GyroConfig, AccelConfig, AccelConfig2, PowerManagement2);

impl Configuration {
    /// Builds a `CONFIG` value selecting the given gyro filter bandwidth.
    pub fn for_bandwidth(bandwidth: DlpfBandwidth) -> Self {
        Self::new().with_dlpf_cfg(bandwidth.code())
    }
}

impl AccelConfig2 {
    /// Builds an `ACCEL_CONFIG2` value selecting the given accelerometer filter bandwidth.
    pub fn for_bandwidth(bandwidth: DlpfBandwidth) -> Self {
        Self::new().with_a_dlpf_cfg(bandwidth.code())
    }
}

impl PowerManagement2 {
    /// Translates an axis enable mask into the register's disable bits.
    pub fn from_enable(enable: SensorEnable) -> Self {
        let [ax, ay, az] = enable.accel;
        let [gx, gy, gz] = enable.gyro;
        Self::new()
            .with_disable_xa(!ax)
            .with_disable_ya(!ay)
            .with_disable_za(!az)
            .with_disable_xg(!gx)
            .with_disable_yg(!gy)
            .with_disable_zg(!gz)
    }
}

impl Register for Configuration {
    const ADDRESS: u8 = REG_CONFIG;
}

impl Register for GyroConfig {
    const ADDRESS: u8 = REG_GYRO_CONFIG;
}

impl Register for AccelConfig {
    const ADDRESS: u8 = REG_ACCEL_CONFIG;
}

impl Register for AccelConfig2 {
    const ADDRESS: u8 = REG_ACCEL_CONFIG2;
}

impl Register for PowerManagement2 {
    const ADDRESS: u8 = REG_PWR_MGMT_2;
}

/// Returns the two-byte `[register, value]` write that programs `value` into `R`.
pub fn register_write<R>(value: R) -> [u8; CONFIG_WRITE_LEN]
where
    R: Register + Into<u8>,
{
    [R::ADDRESS, value.into()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accel_config_places_range_in_bits_4_3() {
        assert_eq!(u8::from(AccelConfig::new().with_fs_sel(AccelRange::G16)), 0x18);
        assert_eq!(u8::from(AccelConfig::new().with_fs_sel(AccelRange::G4)), 0x08);
        assert_eq!(AccelConfig::from(0x10).fs_sel(), AccelRange::G8);
    }

    #[test]
    fn gyro_config_places_range_in_bits_4_3() {
        let gyro = GyroConfig::new().with_fs_sel(GyroRange::Dps2000);
        assert_eq!(u8::from(gyro), 0x18);

        let decoded = GyroConfig::from(0b1000_1011);
        assert!(decoded.x_self_test());
        assert!(!decoded.y_self_test());
        assert_eq!(decoded.fs_sel(), GyroRange::Dps500);
        assert_eq!(decoded.fchoice_b(), 0b11);
    }

    #[test]
    fn power_management_inverts_enable_mask() {
        assert_eq!(u8::from(PowerManagement2::from_enable(SensorEnable::ALL)), 0x00);

        let gyro_off = SensorEnable {
            accel: [true; 3],
            gyro: [false; 3],
        };
        assert_eq!(u8::from(PowerManagement2::from_enable(gyro_off)), 0b0000_0111);

        let accel_x_off = SensorEnable {
            accel: [false, true, true],
            gyro: [true; 3],
        };
        assert_eq!(u8::from(PowerManagement2::from_enable(accel_x_off)), 0b0010_0000);
    }

    #[test]
    fn dlpf_registers_share_filter_code() {
        assert_eq!(u8::from(Configuration::for_bandwidth(DlpfBandwidth::Hz41)), 0x03);
        assert_eq!(u8::from(AccelConfig2::for_bandwidth(DlpfBandwidth::Hz5)), 0x06);
    }

    #[test]
    fn register_write_prefixes_address() {
        let write = register_write(AccelConfig::new().with_fs_sel(AccelRange::G16));
        assert_eq!(write, [REG_ACCEL_CONFIG, 0x18]);
    }
}
