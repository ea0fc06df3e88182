//! Bus interface abstraction for the MPU9250 driver.

pub mod i2c;
pub mod spi;

/// Register-level transactions required by the driver.
///
/// Implementations surface transport failures unchanged and never retry.
pub trait Mpu9250Interface {
    /// Error type produced by the concrete bus implementation.
    type Error;

    /// Writes `start` and then reads `buf.len()` consecutive registers as one atomic
    /// transaction. No other transaction may interleave between the write and the read.
    fn read_registers(&mut self, start: u8, buf: &mut [u8]) -> core::result::Result<(), Self::Error>;

    /// Sends `payload` to the device verbatim.
    fn write_bytes(&mut self, payload: &[u8]) -> core::result::Result<(), Self::Error>;

    /// Writes a single register.
    fn write_register(&mut self, register: u8, value: u8) -> core::result::Result<(), Self::Error> {
        self.write_bytes(&[register, value])
    }
}
