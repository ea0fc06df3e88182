#![cfg_attr(not(test), no_std)]

#[macro_use]
mod log;

mod error;

pub mod config;
pub mod conversion;
pub mod device;
pub mod interface;
pub mod node;
pub mod params;
pub mod registers;
pub mod sample;

pub use crate::conversion::{convert, AxisTransform, CalibratedSample, CalibrationConstants};
pub use crate::device::{Mpu9250, SensorState};
pub use crate::error::{Error, Result};
pub use crate::interface::i2c::BusAddress;
pub use crate::node::{SensorNode, SharedNode};
pub use crate::sample::{RawSample, RAW_SAMPLE_LEN};
