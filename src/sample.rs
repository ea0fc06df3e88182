//! Raw sample layout shared by the producer and consumer sides of the byte stream.

use crate::registers::{ACCEL_LEN, GYRO_LEN, TEMP_LEN};

/// Total size of a raw sample in bytes.
pub const RAW_SAMPLE_LEN: usize = TEMP_LEN + ACCEL_LEN + GYRO_LEN;

const TEMP_OFFSET: usize = 0;
const ACCEL_OFFSET: usize = TEMP_OFFSET + TEMP_LEN;
const GYRO_OFFSET: usize = ACCEL_OFFSET + ACCEL_LEN;

/// Decodes a big-endian register pair into signed counts.
#[inline]
pub fn decode_counts(hi: u8, lo: u8) -> i16 {
    i16::from_be_bytes([hi, lo])
}

/// Encodes signed counts back into the register pair `(hi, lo)`.
#[inline]
pub fn encode_counts(counts: i16) -> (u8, u8) {
    let [hi, lo] = counts.to_be_bytes();
    (hi, lo)
}

/// Fourteen bytes read from the sensor in one acquisition:
/// temperature, accel X/Y/Z and gyro X/Y/Z, each big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample {
    bytes: [u8; RAW_SAMPLE_LEN],
}

impl RawSample {
    /// Wraps a complete 14-byte buffer.
    pub const fn from_bytes(bytes: [u8; RAW_SAMPLE_LEN]) -> Self {
        Self { bytes }
    }

    /// Builds a sample from the three register blocks in acquisition order.
    pub fn from_parts(temp: [u8; TEMP_LEN], accel: [u8; ACCEL_LEN], gyro: [u8; GYRO_LEN]) -> Self {
        let mut bytes = [0u8; RAW_SAMPLE_LEN];
        bytes[TEMP_OFFSET..ACCEL_OFFSET].copy_from_slice(&temp);
        bytes[ACCEL_OFFSET..GYRO_OFFSET].copy_from_slice(&accel);
        bytes[GYRO_OFFSET..].copy_from_slice(&gyro);
        Self { bytes }
    }

    /// Builds a sample from already decoded counts.
    pub fn from_counts(temp: i16, accel: [i16; 3], gyro: [i16; 3]) -> Self {
        let mut bytes = [0u8; RAW_SAMPLE_LEN];
        let counts = core::iter::once(temp).chain(accel).chain(gyro);
        for (chunk, value) in bytes.chunks_exact_mut(2).zip(counts) {
            chunk.copy_from_slice(&value.to_be_bytes());
        }
        Self { bytes }
    }

    /// Returns the wire representation.
    pub const fn as_bytes(&self) -> &[u8; RAW_SAMPLE_LEN] {
        &self.bytes
    }

    /// Temperature counts.
    pub fn temp_counts(&self) -> i16 {
        self.counts_at(TEMP_OFFSET)
    }

    /// Accelerometer X, Y, Z counts in bus order.
    pub fn accel_counts(&self) -> [i16; 3] {
        self.triple_at(ACCEL_OFFSET)
    }

    /// Gyroscope X, Y, Z counts in bus order.
    pub fn gyro_counts(&self) -> [i16; 3] {
        self.triple_at(GYRO_OFFSET)
    }

    fn counts_at(&self, offset: usize) -> i16 {
        decode_counts(self.bytes[offset], self.bytes[offset + 1])
    }

    fn triple_at(&self, offset: usize) -> [i16; 3] {
        [
            self.counts_at(offset),
            self.counts_at(offset + 2),
            self.counts_at(offset + 4),
        ]
    }
}

impl From<RawSample> for [u8; RAW_SAMPLE_LEN] {
    fn from(sample: RawSample) -> Self {
        sample.bytes
    }
}

/// Rejected when a byte slice is not exactly [`RAW_SAMPLE_LEN`] long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidLength(pub usize);

impl TryFrom<&[u8]> for RawSample {
    type Error = InvalidLength;

    fn try_from(bytes: &[u8]) -> core::result::Result<Self, Self::Error> {
        let bytes: [u8; RAW_SAMPLE_LEN] = bytes.try_into().map_err(|_| InvalidLength(bytes.len()))?;
        Ok(Self { bytes })
    }
}
