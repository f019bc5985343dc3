#![no_std]
#![cfg_attr(not(doctest), doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md")))]

#[macro_use]
mod log;

pub mod buffer;
pub mod chip;
pub mod config;
pub mod interface;
pub mod interrupt;
pub mod ll;
pub mod ready;
pub mod register;
pub mod sample;
pub mod uninitialized;

#[cfg(test)]
pub(crate) mod testing;

pub use buffer::BufferMode;
pub use chip::{Chip, ChipDescriptor, RangeCode};
pub use config::{PowerState, Profile};
pub use interface::{I2cTransport, SpiTransport, Transport};
pub use interrupt::{InterruptPin, InterruptStatus, TapDirection, TapEvent};
pub use sample::{BufferResolution, PhysicalSample, RawSample};

/// Errors reported by the driver
///
/// `E` is the error type of the underlying [`Transport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The transport failed while reading or writing a register
    Bus(E),
    /// A caller-supplied value is outside the valid domain of the field
    InvalidArgument,
    /// The configured range cannot be resolved to a scale factor
    InvalidState,
    /// The reset poll ran out of attempts without confirmation
    Timeout,
    /// A step of the command self-test read back an unexpected value
    SelfTestFailed,
    /// Nothing acknowledged the probe at the configured address
    NotPresent,
    /// The identity register holds a value that does not match the chip
    WrongDevice(u8),
    /// The selected chip has no registers for the requested operation
    Unsupported,
}

impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Error::Bus(error)
    }
}

/// Indicates that the [`Triax`] instance has not been probed yet
#[derive(Debug)]
pub struct Uninitialized;

/// Indicates that the [`Triax`] instance is ready to be used
#[derive(Debug)]
pub struct Ready;

/// Accelerometer top-level driver
///
/// One handle drives any of the supported chips, the register layout is
/// taken from the [`Chip`] passed at construction.
///
/// Usage:
///
/// ```rust,ignore
/// fn main() {
///     let address = triax::Chip::Kx134.descriptor().i2c_address(false);
///     let transport = triax::I2cTransport::new(i2c, address);
///     let accel = triax::Triax::new(transport, triax::Chip::Kx134);
///     let mut accel = accel.init().unwrap();
///
///     accel.initialize(triax::Profile::Default).unwrap();
///     accel.set_range(triax::RangeCode::G16).unwrap();
///     loop {
///         if accel.data_ready().unwrap() {
///             let g = accel.accel().unwrap();
///         }
///     }
/// }
/// ```
pub struct Triax<T, State> {
    ll: crate::ll::Ll<T>,
    range: Option<RangeCode>,
    power: Option<PowerState>,
    _state: State,
}

impl<T, State> Triax<T, State> {
    /// The chip this handle was constructed for
    pub fn chip(&self) -> Chip {
        self.ll.chip()
    }

    /// Direct low level access to the underlying transport
    pub fn ll(&mut self) -> &mut crate::ll::Ll<T> {
        &mut self.ll
    }

    /// Release the transport from the driver
    pub fn release(self) -> T {
        self.ll.release()
    }
}
