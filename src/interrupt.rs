//! Interrupt pins, routing and status
//!
//! The KX13X family has two physical interrupt pins, each with its own
//! control register and routing register. Pins are selected with `1` or `2`.

use bilge::prelude::*;

use crate::chip::{InterruptMap, PinGroup};
use crate::interface::Transport;
use crate::{Error, Ready, Triax};

/// Interrupt sources for [`Triax::route_hardware_interrupt`]
///
/// Combine with `|`.
pub mod route {
    pub const FREE_FALL: u8 = 0x80;
    pub const BUFFER_FULL: u8 = 0x40;
    pub const WATERMARK: u8 = 0x20;
    pub const DATA_READY: u8 = 0x10;
    pub const BACK_TO_SLEEP: u8 = 0x08;
    pub const TAP: u8 = 0x04;
    pub const WAKE_UP: u8 = 0x02;
    pub const TILT: u8 = 0x01;
}

/// Physical interrupt pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptPin {
    Int1,
    Int2,
}

/// Pin number outside `1..=2`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidPin(pub u8);

impl TryFrom<u8> for InterruptPin {
    type Error = InvalidPin;

    fn try_from(pin: u8) -> Result<Self, InvalidPin> {
        match pin {
            1 => Ok(InterruptPin::Int1),
            2 => Ok(InterruptPin::Int2),
            other => Err(InvalidPin(other)),
        }
    }
}

impl InterruptPin {
    fn index(self) -> usize {
        match self {
            InterruptPin::Int1 => 0,
            InterruptPin::Int2 => 1,
        }
    }
}

/// Tap event reported in the interrupt status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TapEvent {
    None,
    Single,
    Double,
    Unknown,
}

/// Decoded interrupt source register
#[bitsize(8)]
#[derive(Clone, Copy, DebugBits, FromBits, PartialEq)]
pub struct InterruptStatus {
    pub tilt_changed: bool,
    reserved: u1,
    pub tap: u2,
    pub data_ready: bool,
    pub watermark: bool,
    pub buffer_full: bool,
    pub free_fall: bool,
}

impl InterruptStatus {
    pub fn tap_event(&self) -> TapEvent {
        match self.tap().value() {
            0b00 => TapEvent::None,
            0b01 => TapEvent::Single,
            0b10 => TapEvent::Double,
            _ => TapEvent::Unknown,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for InterruptStatus {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "InterruptStatus {{ free_fall: {}, buffer_full: {}, watermark: {}, data_ready: {}, tap: {}, tilt_changed: {} }}",
            self.free_fall(),
            self.buffer_full(),
            self.watermark(),
            self.data_ready(),
            self.tap_event(),
            self.tilt_changed(),
        );
    }
}

/// Direction of the last detected tap
#[bitsize(8)]
#[derive(Clone, Copy, DebugBits, FromBits, PartialEq)]
pub struct TapDirection {
    pub z_positive: bool,
    pub z_negative: bool,
    pub y_positive: bool,
    pub y_negative: bool,
    pub x_positive: bool,
    pub x_negative: bool,
    reserved: u2,
}

#[cfg(feature = "defmt")]
impl defmt::Format for TapDirection {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "TapDirection {{ x+: {}, x-: {}, y+: {}, y-: {}, z+: {}, z-: {} }}",
            self.x_positive(),
            self.x_negative(),
            self.y_positive(),
            self.y_negative(),
            self.z_positive(),
            self.z_negative(),
        );
    }
}

impl<T> Triax<T, Ready>
where
    T: Transport,
{
    fn interrupts(&self) -> Result<InterruptMap, Error<T::Error>> {
        self.ll.map().interrupts.ok_or(Error::Unsupported)
    }

    fn pin_group(&self, pin: u8) -> Result<PinGroup, Error<T::Error>> {
        let pin = InterruptPin::try_from(pin).map_err(|_| Error::InvalidArgument)?;
        Ok(self.interrupts()?.pins[pin.index()])
    }

    /// Overwrite the whole control register of interrupt pin 1
    pub fn configure_interrupt_pin(&mut self, value: u8) -> Result<(), Error<T::Error>> {
        let field = self.pin_group(1)?.control;
        self.write_configured(field, value)
    }

    /// Enable the physical interrupt pin
    pub fn enable_phys_interrupt(&mut self, enable: bool, pin: u8) -> Result<(), Error<T::Error>> {
        let field = self.pin_group(pin)?.enable;
        self.write_configured(field, enable as u8)
    }

    /// Select the pin polarity, active high or active low
    pub fn set_pin_mode(&mut self, active_high: bool, pin: u8) -> Result<(), Error<T::Error>> {
        let field = self.pin_group(pin)?.active_high;
        self.write_configured(field, active_high as u8)
    }

    /// Select pulsed (`true`) or latched (`false`) interrupts
    pub fn set_latch_control(&mut self, pulsed: bool, pin: u8) -> Result<(), Error<T::Error>> {
        let field = self.pin_group(pin)?.pulsed;
        self.write_configured(field, pulsed as u8)
    }

    /// Set the pulse width code, at most 3
    pub fn set_pulse_width(&mut self, width: u8, pin: u8) -> Result<(), Error<T::Error>> {
        let field = self.pin_group(pin)?.pulse_width;
        self.write_configured(field, width)
    }

    /// Route interrupt sources to a pin, see [`route`]
    ///
    /// Replaces the routing of the pin.
    pub fn route_hardware_interrupt(&mut self, sources: u8, pin: u8) -> Result<(), Error<T::Error>> {
        let field = self.pin_group(pin)?.route;
        debug!("routing {=u8:#x} to pin {}", sources, pin);
        self.write_configured(field, sources)
    }

    /// Release latched interrupts
    pub fn clear_interrupt(&mut self) -> Result<(), Error<T::Error>> {
        let register = self.interrupts()?.release;
        self.ll.read_register(register)?;
        Ok(())
    }

    pub fn interrupt_status(&mut self) -> Result<InterruptStatus, Error<T::Error>> {
        let register = self.interrupts()?.status;
        Ok(InterruptStatus::from(self.ll.read_register(register)?))
    }

    /// New acceleration data is available
    pub fn data_ready(&mut self) -> Result<bool, Error<T::Error>> {
        let field = self.interrupts()?.data_ready;
        Ok(self.ll.read_field(field)? != 0)
    }

    pub fn tap_direction(&mut self) -> Result<TapDirection, Error<T::Error>> {
        let register = self.interrupts()?.direction;
        Ok(TapDirection::from(self.ll.read_register(register)?))
    }
}
