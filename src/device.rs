//! High-level MPU9250 sensor handle.

use crate::config::Config;
use crate::conversion::{convert, AxisTransform, CalibratedSample, CalibrationConstants};
use crate::error::{Error, Result};
use crate::interface::i2c::{BusAddress, I2cInterface};
use crate::interface::spi::SpiInterface;
use crate::interface::Mpu9250Interface;
use crate::registers::{
    register_write,
    AccelConfig,
    AccelConfig2,
    Configuration,
    GyroConfig,
    PowerManagement2,
    Register,
    ACCEL_LEN,
    CONFIG_WRITE_LEN,
    GYRO_LEN,
    REG_ACCEL_XOUT_H,
    REG_GYRO_XOUT_H,
    REG_SMPLRT_DIV,
    REG_TEMP_OUT_H,
    REG_WHO_AM_I,
    TEMP_LEN,
    WHO_AM_I_MPU9250,
    WHO_AM_I_MPU9255,
};
use crate::sample::RawSample;
use embedded_hal::i2c::I2c;
use embedded_hal::spi::SpiDevice;

/// Bring-up state of the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorState {
    /// Power-on register defaults; samples are not served.
    Unconfigured,
    /// Ranges and enable bits programmed by [`Mpu9250::init`].
    Configured,
}

/// Synchronous handle for one MPU9250.
///
/// Every operation takes `&mut self`, so the three reads of an acquisition can never
/// interleave with another transaction issued through the same handle.
pub struct Mpu9250<IFACE> {
    interface: IFACE,
    config: Config,
    state: SensorState,
}

impl<IFACE> Mpu9250<IFACE> {
    // ==================================================================
    // == Driver Construction & Ownership ===============================
    // ==================================================================
    /// Creates a new, unconfigured handle from the provided bus interface.
    pub fn new(interface: IFACE, config: Config) -> Self {
        Self {
            interface,
            config,
            state: SensorState::Unconfigured,
        }
    }

    /// Consumes the handle and returns the owned interface.
    pub fn release(self) -> (IFACE, Config) {
        (self.interface, self.config)
    }

    /// Provides mutable access to the underlying interface.
    pub fn interface_mut(&mut self) -> &mut IFACE {
        &mut self.interface
    }

    /// Returns the configuration applied (or to be applied) at bring-up.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the current bring-up state.
    pub fn state(&self) -> SensorState {
        self.state
    }

    /// Calibration constants matching the full-scale ranges in the bring-up [`Config`].
    ///
    /// Ranges are treated as fixed after [`Mpu9250::init`]. A runtime
    /// [`Mpu9250::write_config_payload`] to `ACCEL_CONFIG` or `GYRO_CONFIG` is not tracked,
    /// so the constants returned here no longer match the sensor after such a write.
    pub fn calibration(&self) -> CalibrationConstants {
        CalibrationConstants::for_config(&self.config)
    }
}

impl<I2C> Mpu9250<I2cInterface<I2C>>
where
    I2C: I2c,
{
    // ==================================================================
    // == I2C Convenience Constructors ==================================
    // ==================================================================
    /// Convenience constructor for I²C transports.
    pub fn new_i2c(i2c: I2C, address: BusAddress, config: Config) -> Self {
        Self::new(I2cInterface::new(i2c, address), config)
    }

    /// Releases the handle, returning the I²C bus and configuration.
    pub fn release_i2c(self) -> (I2C, Config) {
        let (iface, config) = self.release();
        (iface.release(), config)
    }
}

impl<SPI> Mpu9250<SpiInterface<SPI>>
where
    SPI: SpiDevice,
{
    // ==================================================================
    // == SPI Convenience Constructors ==================================
    // ==================================================================
    /// Convenience constructor for SPI transports.
    pub fn new_spi(spi: SPI, config: Config) -> Self {
        Self::new(SpiInterface::new(spi), config)
    }

    /// Releases the handle, returning the SPI device and configuration.
    pub fn release_spi(self) -> (SPI, Config) {
        let (iface, config) = self.release();
        (iface.release(), config)
    }
}

impl<IFACE, CommE> Mpu9250<IFACE>
where
    IFACE: Mpu9250Interface<Error = CommE>,
{
    // ==================================================================
    // == Initialization =================================================
    // ==================================================================
    /// Brings the sensor from power-on defaults to [`SensorState::Configured`].
    ///
    /// Writes the accelerometer range, the gyroscope range, the optional filter and sample
    /// rate settings, and finally the axis enable mask. Each write is an independent
    /// two-byte transaction; the first failure aborts bring-up and leaves the state
    /// [`SensorState::Unconfigured`].
    pub fn init(&mut self) -> Result<(), CommE> {
        let config = self.config;
        config.validate().map_err(|_| Error::InvalidConfig)?;
        self.state = SensorState::Unconfigured;

        let accel = AccelConfig::new().with_fs_sel(config.accel_range);
        self.write_config_register(accel)?;
        info!("mpu9250: configured accelerometer range {:#x}", u8::from(accel));

        let gyro = GyroConfig::new().with_fs_sel(config.gyro_range);
        self.write_config_register(gyro)?;
        info!("mpu9250: configured gyroscope range {:#x}", u8::from(gyro));

        if let Some(bandwidth) = config.bandwidth {
            self.write_config_register(Configuration::for_bandwidth(bandwidth))?;
            self.write_config_register(AccelConfig2::for_bandwidth(bandwidth))?;
            debug!("mpu9250: low-pass filter set to {} Hz", bandwidth.hz());
        }

        if let Some(divider) = config.sample_rate_divider {
            self.apply_configuration(REG_SMPLRT_DIV, divider)?;
            debug!("mpu9250: sample rate divider set to {}", divider);
        }

        self.write_config_register(PowerManagement2::from_enable(config.enable))?;
        info!("mpu9250: accelerometer and gyroscope enabled");

        self.state = SensorState::Configured;
        Ok(())
    }

    /// Writes `value` into `register` as one two-byte transaction.
    pub fn apply_configuration(&mut self, register: u8, value: u8) -> Result<(), CommE> {
        self.interface
            .write_register(register, value)
            .map_err(Error::from)
    }

    /// Forwards a runtime `[register, value]` payload to the sensor unmodified.
    ///
    /// Any length other than two is rejected before touching the bus.
    pub fn write_config_payload(&mut self, payload: &[u8]) -> Result<(), CommE> {
        if payload.len() != CONFIG_WRITE_LEN {
            warn!("mpu9250: rejected {}-byte configuration write", payload.len());
            return Err(Error::InvalidArgument);
        }

        self.write_bytes(payload)
    }

    fn write_config_register<R>(&mut self, value: R) -> Result<(), CommE>
    where
        R: Register + Into<u8>,
    {
        let [register, value] = register_write(value);
        self.apply_configuration(register, value)
    }

    // ==================================================================
    // == Register Transactions ==========================================
    // ==================================================================
    /// Reads `buf.len()` registers starting at `start` in one write-then-read transaction.
    pub fn read_registers(&mut self, start: u8, buf: &mut [u8]) -> Result<(), CommE> {
        self.interface
            .read_registers(start, buf)
            .map_err(Error::from)
    }

    /// Sends `payload` to the sensor verbatim.
    pub fn write_bytes(&mut self, payload: &[u8]) -> Result<(), CommE> {
        self.interface.write_bytes(payload).map_err(Error::from)
    }

    // ==================================================================
    // == Identification =================================================
    // ==================================================================
    /// Reads the `WHO_AM_I` register.
    pub fn who_am_i(&mut self) -> Result<u8, CommE> {
        let mut id = [0u8; 1];
        self.read_registers(REG_WHO_AM_I, &mut id)?;
        Ok(id[0])
    }

    /// Verifies that the device identifies as an MPU9250-class part.
    pub fn check_id(&mut self) -> Result<u8, CommE> {
        match self.who_am_i()? {
            id @ (WHO_AM_I_MPU9250 | WHO_AM_I_MPU9255) => Ok(id),
            other => {
                error!("mpu9250: unexpected WHO_AM_I {:#x}", other);
                Err(Error::DeviceIdMismatch(other))
            }
        }
    }

    // ==================================================================
    // == Data Acquisition ===============================================
    // ==================================================================
    /// Reads temperature, accelerometer and gyroscope registers, in that order, into a
    /// fresh sample.
    ///
    /// Fails with [`Error::DeviceNotReady`] before bring-up. A failing sub-read aborts the
    /// acquisition and no partial sample is returned.
    pub fn acquire_raw_sample(&mut self) -> Result<RawSample, CommE> {
        if self.state != SensorState::Configured {
            return Err(Error::DeviceNotReady);
        }

        let mut temp = [0u8; TEMP_LEN];
        let mut accel = [0u8; ACCEL_LEN];
        let mut gyro = [0u8; GYRO_LEN];
        self.read_registers(REG_TEMP_OUT_H, &mut temp)?;
        self.read_registers(REG_ACCEL_XOUT_H, &mut accel)?;
        self.read_registers(REG_GYRO_XOUT_H, &mut gyro)?;

        Ok(RawSample::from_parts(temp, accel, gyro))
    }

    /// Acquires a sample and converts it to physical units on the producer side.
    pub fn read_calibrated(
        &mut self,
        calibration: &CalibrationConstants,
        transform: &AxisTransform,
    ) -> Result<CalibratedSample, CommE> {
        let raw = self.acquire_raw_sample()?;
        Ok(convert(&raw, calibration, transform))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{AccelRange, DlpfBandwidth, GyroRange, SensorEnable};
    use crate::registers::{REG_ACCEL_CONFIG, REG_GYRO_CONFIG, REG_PWR_MGMT_2};
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock, Transaction};

    const ADDR: u8 = 0x68;

    fn bring_up_writes() -> [Transaction; 3] {
        [
            Transaction::write(ADDR, vec![REG_ACCEL_CONFIG, 0x18]),
            Transaction::write(ADDR, vec![REG_GYRO_CONFIG, 0x18]),
            Transaction::write(ADDR, vec![REG_PWR_MGMT_2, 0x00]),
        ]
    }

    fn sample_reads() -> [Transaction; 3] {
        [
            Transaction::write_read(ADDR, vec![REG_TEMP_OUT_H], vec![0x0B, 0xB8]),
            Transaction::write_read(
                ADDR,
                vec![REG_ACCEL_XOUT_H],
                vec![0x00, 0x64, 0x00, 0xC8, 0x01, 0x2C],
            ),
            Transaction::write_read(
                ADDR,
                vec![REG_GYRO_XOUT_H],
                vec![0xFF, 0xF6, 0x00, 0x14, 0x80, 0x00],
            ),
        ]
    }

    #[test]
    fn init_writes_range_then_enable_sequence() {
        let expectations = bring_up_writes();
        let mut sensor = Mpu9250::new_i2c(Mock::new(&expectations), BusAddress::AD0_LOW, Config::default());
        assert_eq!(sensor.state(), SensorState::Unconfigured);

        sensor.init().unwrap();
        assert_eq!(sensor.state(), SensorState::Configured);

        let (mut i2c, _) = sensor.release_i2c();
        i2c.done();
    }

    #[test]
    fn init_programs_optional_filter_and_divider_before_enable() {
        let expectations = [
            Transaction::write(ADDR, vec![REG_ACCEL_CONFIG, 0x08]),
            Transaction::write(ADDR, vec![REG_GYRO_CONFIG, 0x08]),
            Transaction::write(ADDR, vec![0x1A, 0x03]),
            Transaction::write(ADDR, vec![0x1D, 0x03]),
            Transaction::write(ADDR, vec![REG_SMPLRT_DIV, 4]),
            Transaction::write(ADDR, vec![REG_PWR_MGMT_2, 0x07]),
        ];
        let config = Config::new()
            .accel_range(AccelRange::G4)
            .gyro_range(GyroRange::Dps500)
            .bandwidth(DlpfBandwidth::Hz41)
            .sample_rate_divider(4)
            .enable(SensorEnable {
                accel: [true; 3],
                gyro: [false; 3],
            })
            .build();
        let mut sensor = Mpu9250::new_i2c(Mock::new(&expectations), BusAddress::AD0_LOW, config);

        sensor.init().unwrap();

        let (mut i2c, _) = sensor.release_i2c();
        i2c.done();
    }

    #[test]
    fn init_failure_leaves_sensor_unconfigured() {
        let expectations = [
            Transaction::write(ADDR, vec![REG_ACCEL_CONFIG, 0x18]),
            Transaction::write(ADDR, vec![REG_GYRO_CONFIG, 0x18]).with_error(ErrorKind::Other),
        ];
        let mut sensor = Mpu9250::new_i2c(Mock::new(&expectations), BusAddress::AD0_LOW, Config::default());

        assert_eq!(sensor.init(), Err(Error::TransportFailure(ErrorKind::Other)));
        assert_eq!(sensor.state(), SensorState::Unconfigured);
        assert_eq!(sensor.acquire_raw_sample(), Err(Error::DeviceNotReady));

        let (mut i2c, _) = sensor.release_i2c();
        i2c.done();
    }

    #[test]
    fn init_rejects_invalid_config_without_bus_traffic() {
        let expectations: [Transaction; 0] = [];
        let config = Config::new()
            .enable(SensorEnable {
                accel: [false; 3],
                gyro: [false; 3],
            })
            .build();
        let mut sensor = Mpu9250::new_i2c(Mock::new(&expectations), BusAddress::AD0_LOW, config);

        assert_eq!(sensor.init(), Err(Error::InvalidConfig));

        let (mut i2c, _) = sensor.release_i2c();
        i2c.done();
    }

    #[test]
    fn acquire_reads_temperature_accel_gyro_in_order() {
        let expectations: Vec<Transaction> = bring_up_writes()
            .into_iter()
            .chain(sample_reads())
            .collect();
        let mut sensor = Mpu9250::new_i2c(Mock::new(&expectations), BusAddress::AD0_LOW, Config::default());
        sensor.init().unwrap();

        let sample = sensor.acquire_raw_sample().unwrap();
        assert_eq!(
            sample.as_bytes(),
            &[0x0B, 0xB8, 0x00, 0x64, 0x00, 0xC8, 0x01, 0x2C, 0xFF, 0xF6, 0x00, 0x14, 0x80, 0x00]
        );
        assert_eq!(sample.temp_counts(), 3000);
        assert_eq!(sample.accel_counts(), [100, 200, 300]);
        assert_eq!(sample.gyro_counts(), [-10, 20, i16::MIN]);

        let (mut i2c, _) = sensor.release_i2c();
        i2c.done();
    }

    #[test]
    fn acquire_before_init_is_not_ready_and_silent() {
        let expectations: [Transaction; 0] = [];
        let mut sensor = Mpu9250::new_i2c(Mock::new(&expectations), BusAddress::AD0_LOW, Config::default());

        assert_eq!(sensor.acquire_raw_sample(), Err(Error::DeviceNotReady));

        let (mut i2c, _) = sensor.release_i2c();
        i2c.done();
    }

    #[test]
    fn failing_sub_read_aborts_acquisition() {
        let expectations: Vec<Transaction> = bring_up_writes()
            .into_iter()
            .chain([
                Transaction::write_read(ADDR, vec![REG_TEMP_OUT_H], vec![0x0B, 0xB8]),
                Transaction::write_read(ADDR, vec![REG_ACCEL_XOUT_H], vec![0; 6])
                    .with_error(ErrorKind::NoAcknowledge(
                        embedded_hal::i2c::NoAcknowledgeSource::Data,
                    )),
            ])
            .collect();
        let mut sensor = Mpu9250::new_i2c(Mock::new(&expectations), BusAddress::AD0_LOW, Config::default());
        sensor.init().unwrap();

        assert_eq!(
            sensor.acquire_raw_sample(),
            Err(Error::TransportFailure(ErrorKind::NoAcknowledge(
                embedded_hal::i2c::NoAcknowledgeSource::Data
            )))
        );

        let (mut i2c, _) = sensor.release_i2c();
        i2c.done();
    }

    #[test]
    fn read_calibrated_converts_acquired_sample() {
        let expectations: Vec<Transaction> = bring_up_writes()
            .into_iter()
            .chain(sample_reads())
            .collect();
        let mut sensor = Mpu9250::new_i2c(Mock::new(&expectations), BusAddress::AD0_LOW, Config::default());
        sensor.init().unwrap();

        let calibration = sensor.calibration();
        let sample = sensor
            .read_calibrated(&calibration, &AxisTransform::default())
            .unwrap();
        let expected = convert(
            &RawSample::from_counts(3000, [100, 200, 300], [-10, 20, i16::MIN]),
            &calibration,
            &AxisTransform::default(),
        );
        assert_eq!(sample, expected);

        let (mut i2c, _) = sensor.release_i2c();
        i2c.done();
    }

    #[test]
    fn wrong_sized_payload_is_rejected_without_bus_traffic() {
        let expectations: [Transaction; 0] = [];
        let mut sensor = Mpu9250::new_i2c(Mock::new(&expectations), BusAddress::AD0_LOW, Config::default());

        assert_eq!(sensor.write_config_payload(&[]), Err(Error::InvalidArgument));
        assert_eq!(sensor.write_config_payload(&[0x1C]), Err(Error::InvalidArgument));
        assert_eq!(sensor.write_config_payload(&[0x1C, 0x00, 0x00]), Err(Error::InvalidArgument));

        let (mut i2c, _) = sensor.release_i2c();
        i2c.done();
    }

    #[test]
    fn two_byte_payload_is_forwarded_verbatim() {
        let expectations = [Transaction::write(ADDR, vec![0x1C, 0x10])];
        let mut sensor = Mpu9250::new_i2c(Mock::new(&expectations), BusAddress::AD0_LOW, Config::default());

        sensor.write_config_payload(&[0x1C, 0x10]).unwrap();

        let (mut i2c, _) = sensor.release_i2c();
        i2c.done();
    }

    #[test]
    fn calibration_keeps_bring_up_ranges_after_runtime_range_write() {
        let expectations: Vec<Transaction> = bring_up_writes()
            .into_iter()
            .chain([Transaction::write(ADDR, vec![REG_ACCEL_CONFIG, 0x00])])
            .collect();
        let mut sensor = Mpu9250::new_i2c(Mock::new(&expectations), BusAddress::AD0_LOW, Config::default());
        sensor.init().unwrap();

        // Sensor is now at ±2 g, but the constants still describe the bring-up range.
        sensor.write_config_payload(&[REG_ACCEL_CONFIG, 0x00]).unwrap();
        let calibration = sensor.calibration();
        assert_eq!(calibration.accel_range, AccelRange::G16);
        assert_eq!(calibration.gyro_range, GyroRange::Dps2000);
        assert_eq!(sensor.state(), SensorState::Configured);

        let (mut i2c, _) = sensor.release_i2c();
        i2c.done();
    }

    #[test]
    fn check_id_accepts_known_parts() {
        let expectations = [
            Transaction::write_read(ADDR, vec![REG_WHO_AM_I], vec![WHO_AM_I_MPU9250]),
            Transaction::write_read(ADDR, vec![REG_WHO_AM_I], vec![WHO_AM_I_MPU9255]),
            Transaction::write_read(ADDR, vec![REG_WHO_AM_I], vec![0x70]),
        ];
        let mut sensor = Mpu9250::new_i2c(Mock::new(&expectations), BusAddress::AD0_LOW, Config::default());

        assert_eq!(sensor.check_id(), Ok(WHO_AM_I_MPU9250));
        assert_eq!(sensor.check_id(), Ok(WHO_AM_I_MPU9255));
        assert_eq!(sensor.check_id(), Err(Error::DeviceIdMismatch(0x70)));

        let (mut i2c, _) = sensor.release_i2c();
        i2c.done();
    }
}
