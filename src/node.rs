//! Byte-stream boundary in front of a bound sensor.
//!
//! A read returns the 14 raw bytes of one acquisition, unconverted; consumers decode them
//! with [`RawSample::try_from`](crate::sample::RawSample) and
//! [`convert`](crate::conversion::convert). A write forwards exactly one `[register, value]`
//! pair to the sensor.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::device::Mpu9250;
use crate::error::{Error, Result};
use crate::interface::Mpu9250Interface;
use crate::registers::CONFIG_WRITE_LEN;
use crate::sample::RAW_SAMPLE_LEN;

/// Stream endpoint owning an optional sensor handle and an open counter.
pub struct SensorNode<IFACE> {
    device: Option<Mpu9250<IFACE>>,
    open_count: u32,
}

impl<IFACE> SensorNode<IFACE> {
    /// Creates an endpoint with no sensor bound.
    pub const fn new() -> Self {
        Self {
            device: None,
            open_count: 0,
        }
    }

    /// Returns `true` while a sensor handle is bound.
    pub fn is_bound(&self) -> bool {
        self.device.is_some()
    }

    /// Unbinds and returns the sensor handle, if any.
    pub fn remove(&mut self) -> Option<Mpu9250<IFACE>> {
        let device = self.device.take();
        if device.is_some() {
            info!("mpu9250: sensor unbound");
        }
        device
    }

    /// Registers a consumer and returns the number of opens so far.
    pub fn open(&mut self) -> u32 {
        self.open_count = self.open_count.saturating_add(1);
        info!("mpu9250: device has been opened {} time(s)", self.open_count);
        self.open_count
    }

    /// Drops one consumer registration.
    pub fn release(&mut self) {
        self.open_count = self.open_count.saturating_sub(1);
        info!("mpu9250: device successfully closed");
    }

    /// Number of consumers currently holding the endpoint open.
    pub fn open_count(&self) -> u32 {
        self.open_count
    }
}

impl<IFACE> Default for SensorNode<IFACE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<IFACE, CommE> SensorNode<IFACE>
where
    IFACE: Mpu9250Interface<Error = CommE>,
{
    /// Binds `device` and runs its bring-up sequence.
    ///
    /// The handle stays bound when bring-up fails so it can be retried with
    /// [`SensorNode::reinit`]; reads report [`Error::DeviceNotReady`] until then.
    ///
    /// Fails with [`Error::InvalidArgument`] while another sensor is bound; the bound
    /// handle is kept and must be taken back with [`SensorNode::remove`] first.
    pub fn probe(&mut self, device: Mpu9250<IFACE>) -> Result<(), CommE> {
        if self.is_bound() {
            warn!("mpu9250: bind rejected, a sensor is already bound");
            return Err(Error::InvalidArgument);
        }

        info!("mpu9250: probe");
        let device = self.device.insert(device);
        device.init()
    }

    /// Repeats bring-up on the bound sensor.
    pub fn reinit(&mut self) -> Result<(), CommE> {
        self.device_mut()?.init()
    }

    /// Copies one raw sample into `out` and returns the number of bytes written.
    ///
    /// `out` must hold at least [`RAW_SAMPLE_LEN`] bytes. On error nothing is written.
    pub fn read(&mut self, out: &mut [u8]) -> Result<usize, CommE> {
        let device = self.device_mut()?;
        let Some(dest) = out.get_mut(..RAW_SAMPLE_LEN) else {
            return Err(Error::InvalidArgument);
        };

        let sample = device.acquire_raw_sample()?;
        dest.copy_from_slice(sample.as_bytes());
        debug!("mpu9250: sent {} bytes to the consumer", RAW_SAMPLE_LEN);
        Ok(RAW_SAMPLE_LEN)
    }

    /// Forwards a two-byte `[register, value]` write and returns the number of bytes sent.
    pub fn write(&mut self, data: &[u8]) -> Result<usize, CommE> {
        if data.len() != CONFIG_WRITE_LEN {
            warn!("mpu9250: rejected {}-byte write", data.len());
            return Err(Error::InvalidArgument);
        }

        self.device_mut()?.write_config_payload(data)?;
        Ok(CONFIG_WRITE_LEN)
    }

    fn device_mut(&mut self) -> Result<&mut Mpu9250<IFACE>, CommE> {
        self.device.as_mut().ok_or(Error::DeviceNotReady)
    }
}

/// [`SensorNode`] behind a critical-section lock.
///
/// Each call holds the lock for its whole duration, so an acquisition's three register
/// reads never interleave with a write issued from another context.
pub struct SharedNode<IFACE> {
    inner: Mutex<RefCell<SensorNode<IFACE>>>,
}

impl<IFACE> SharedNode<IFACE> {
    /// Creates a shared endpoint with no sensor bound.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(SensorNode::new())),
        }
    }

    /// Runs `f` with exclusive access to the wrapped endpoint.
    pub fn lock<R>(&self, f: impl FnOnce(&mut SensorNode<IFACE>) -> R) -> R {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }

    /// See [`SensorNode::open`].
    pub fn open(&self) -> u32 {
        self.lock(SensorNode::open)
    }

    /// See [`SensorNode::release`].
    pub fn release(&self) {
        self.lock(SensorNode::release)
    }

    /// See [`SensorNode::remove`].
    pub fn remove(&self) -> Option<Mpu9250<IFACE>> {
        self.lock(SensorNode::remove)
    }
}

impl<IFACE> Default for SharedNode<IFACE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<IFACE, CommE> SharedNode<IFACE>
where
    IFACE: Mpu9250Interface<Error = CommE>,
{
    /// See [`SensorNode::probe`].
    pub fn probe(&self, device: Mpu9250<IFACE>) -> Result<(), CommE> {
        self.lock(|node| node.probe(device))
    }

    /// See [`SensorNode::read`].
    pub fn read(&self, out: &mut [u8]) -> Result<usize, CommE> {
        self.lock(|node| node.read(out))
    }

    /// See [`SensorNode::write`].
    pub fn write(&self, data: &[u8]) -> Result<usize, CommE> {
        self.lock(|node| node.write(data))
    }
}
