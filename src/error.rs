//! Error handling primitives for the MPU9250 driver.

/// Crate-wide result type alias.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Error variants produced by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The bus transaction failed (NACK, timeout, arbitration loss). Never retried here.
    TransportFailure(E),
    /// No sensor is bound, or the bound sensor has not been brought up yet.
    DeviceNotReady,
    /// A payload or buffer had the wrong size.
    InvalidArgument,
    /// The provided configuration parameters are invalid.
    InvalidConfig,
    /// `WHO_AM_I` returned an identifier that is not an MPU9250-class part.
    DeviceIdMismatch(u8),
}

impl<E> From<E> for Error<E> {
    fn from(err: E) -> Self {
        Self::TransportFailure(err)
    }
}
