//! I²C interface implementation built on top of `embedded-hal` `I2c`.

use embedded_hal::i2c::{I2c, SevenBitAddress};

use super::Mpu9250Interface;

/// 7-bit I²C address of the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusAddress(pub SevenBitAddress);

impl BusAddress {
    /// Address with the AD0 pin tied low.
    pub const AD0_LOW: Self = Self(0x68);
    /// Address with the AD0 pin tied high.
    pub const AD0_HIGH: Self = Self(0x69);
}

impl Default for BusAddress {
    fn default() -> Self {
        Self::AD0_LOW
    }
}

/// I²C-based interface implementation for the MPU9250 driver.
pub struct I2cInterface<I2C> {
    i2c: I2C,
    address: BusAddress,
}

impl<I2C> I2cInterface<I2C> {
    /// Creates a new interface talking to the device at `address`.
    pub const fn new(i2c: I2C, address: BusAddress) -> Self {
        Self { i2c, address }
    }

    /// Returns the device address used for every transaction.
    pub fn address(&self) -> BusAddress {
        self.address
    }

    /// Provides mutable access to the wrapped bus.
    pub fn i2c_mut(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    /// Consumes the interface and returns the owned bus.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> Mpu9250Interface for I2cInterface<I2C>
where
    I2C: I2c,
{
    type Error = I2C::Error;

    fn read_registers(&mut self, start: u8, buf: &mut [u8]) -> core::result::Result<(), Self::Error> {
        if buf.is_empty() {
            return Ok(());
        }

        // Repeated start keeps the register pointer write and the burst read in one transfer.
        self.i2c.write_read(self.address.0, &[start], buf)
    }

    fn write_bytes(&mut self, payload: &[u8]) -> core::result::Result<(), Self::Error> {
        if payload.is_empty() {
            return Ok(());
        }

        self.i2c.write(self.address.0, payload)
    }
}
