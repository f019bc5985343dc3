//! Configuration engine
//!
//! Most control fields only take effect while the part is in standby. Writes
//! to those fields go through a [`Standby`] guard that records the power state
//! on entry and restores it when the write is done, including on error paths.

use core::ops::{Deref, DerefMut};

use crate::buffer::BufferMode;
use crate::chip::{MotionMap, RangeCode};
use crate::interface::Transport;
use crate::interrupt::route;
use crate::ll::Ll;
use crate::register::Field;
use crate::sample::BufferResolution;
use crate::{Error, Ready, Triax};

/// Operating mode of the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    Standby,
    Operating,
}

impl PowerState {
    fn from_bit(bit: u8) -> Self {
        if bit == 0 {
            PowerState::Standby
        } else {
            PowerState::Operating
        }
    }

    fn bit(self) -> u8 {
        match self {
            PowerState::Standby => 0,
            PowerState::Operating => 1,
        }
    }
}

/// Named start-up configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Profile {
    /// High performance, lowest range, polled output registers
    Default,
    /// Like `Default` with data ready routed to interrupt pin 1
    Interrupt,
    /// Data ready engine enabled without touching the pins
    SoftwareInterrupt,
    /// 16 bit FIFO buffer with the buffer full interrupt on pin 1
    Buffer,
}

/// Scoped standby
///
/// Entering reads the power field and puts an operating part into standby.
/// [`Standby::restore`] returns it to the recorded state. If the guard is
/// dropped without calling `restore`, the restore is still attempted and a
/// failure is only logged.
pub struct Standby<'a, T: Transport> {
    ll: &'a mut Ll<T>,
    prior: PowerState,
    armed: bool,
}

impl<'a, T: Transport> Standby<'a, T> {
    pub fn enter(ll: &'a mut Ll<T>) -> Result<Self, Error<T::Error>> {
        let power = ll.map().power;
        let prior = PowerState::from_bit(ll.read_field(power)?);
        if prior == PowerState::Operating {
            ll.write_field(power, PowerState::Standby.bit())?;
        }
        Ok(Standby {
            ll,
            prior,
            armed: true,
        })
    }

    /// Return to the recorded power state
    pub fn restore(mut self) -> Result<PowerState, Error<T::Error>> {
        self.armed = false;
        if self.prior == PowerState::Operating {
            let power = self.ll.map().power;
            self.ll.write_field(power, self.prior.bit())?;
        }
        Ok(self.prior)
    }
}

impl<T: Transport> Drop for Standby<'_, T> {
    fn drop(&mut self) {
        if !self.armed || self.prior == PowerState::Standby {
            return;
        }
        let power = self.ll.map().power;
        if self.ll.write_field(power, self.prior.bit()).is_err() {
            warn!("failed to restore the power state");
        }
    }
}

impl<T: Transport> Deref for Standby<'_, T> {
    type Target = Ll<T>;

    fn deref(&self) -> &Ll<T> {
        self.ll
    }
}

impl<T: Transport> DerefMut for Standby<'_, T> {
    fn deref_mut(&mut self) -> &mut Ll<T> {
        self.ll
    }
}

impl<T> Triax<T, Ready>
where
    T: Transport,
{
    /// Write a field, wrapping it in standby if the field requires it
    pub(crate) fn write_configured(
        &mut self,
        field: Field,
        value: u8,
    ) -> Result<(), Error<T::Error>> {
        if value > field.max() {
            return Err(Error::InvalidArgument);
        }
        if !field.gated {
            return self.ll.write_field(field, value);
        }

        let mut standby = Standby::enter(&mut self.ll)?;
        standby.write_field(field, value)?;
        self.power = Some(standby.restore()?);
        Ok(())
    }

    /// Raw value of the identity register
    pub fn unique_id(&mut self) -> Result<u8, Error<T::Error>> {
        let register = self.ll.map().who_am_i;
        self.ll.read_register(register)
    }

    /// Switch between operating and standby
    pub fn enable_accel(&mut self, enable: bool) -> Result<(), Error<T::Error>> {
        let state = if enable {
            PowerState::Operating
        } else {
            PowerState::Standby
        };
        let power = self.ll.map().power;
        self.ll.write_field(power, state.bit())?;
        self.power = Some(state);
        debug!("power state {}", state);
        Ok(())
    }

    /// Read the power state from the device
    pub fn power_state(&mut self) -> Result<PowerState, Error<T::Error>> {
        let power = self.ll.map().power;
        let state = PowerState::from_bit(self.ll.read_field(power)?);
        self.power = Some(state);
        Ok(state)
    }

    /// Power state last written or read, if known
    pub fn cached_power_state(&self) -> Option<PowerState> {
        self.power
    }

    /// Select the measurement range
    ///
    /// Ranges the chip does not support are rejected without touching the
    /// device. If the bus fails part way, the cached range is cleared rather
    /// than kept at its previous value, since the device may already hold the
    /// new code. The next conversion then reads the range back.
    pub fn set_range(&mut self, range: RangeCode) -> Result<(), Error<T::Error>> {
        let entry = self
            .ll
            .descriptor()
            .range(range)
            .ok_or(Error::InvalidArgument)?;
        let field = self.ll.map().range;

        match self.write_configured(field, entry.code) {
            Ok(()) => {
                debug!("range set to {}", range);
                self.range = Some(range);
                Ok(())
            }
            Err(e) => {
                self.range = None;
                Err(e)
            }
        }
    }

    /// Cached range, `None` until set or read back
    pub fn range(&self) -> Option<RangeCode> {
        self.range
    }

    /// Read the range from the device and refresh the cache
    pub fn read_range(&mut self) -> Result<RangeCode, Error<T::Error>> {
        let field = self.ll.map().range;
        let code = self.ll.read_field(field)?;
        match self.ll.descriptor().range_by_code(code) {
            Some(entry) => {
                self.range = Some(entry.range);
                Ok(entry.range)
            }
            None => {
                warn!("unknown range code {=u8:#x}", code);
                self.range = None;
                Err(Error::InvalidState)
            }
        }
    }

    /// Set the output data rate code, at most 15
    pub fn set_output_data_rate(&mut self, rate: u8) -> Result<(), Error<T::Error>> {
        let field = self.ll.map().output_data_rate;
        self.write_configured(field, rate)
    }

    /// Output data rate in Hz, `base * 2^code`
    pub fn output_data_rate_hz(&mut self) -> Result<f32, Error<T::Error>> {
        let field = self.ll.map().output_data_rate;
        let code = self.ll.read_field(field)?;
        Ok(self.ll.descriptor().odr_base_hz * (1u32 << code) as f32)
    }

    fn motion(&self) -> Result<MotionMap, Error<T::Error>> {
        self.ll.map().motion.ok_or(Error::Unsupported)
    }

    /// Set the tap/double tap engine rate code, at most 7
    pub fn set_tap_data_rate(&mut self, rate: u8) -> Result<(), Error<T::Error>> {
        let field = self.motion()?.tap_rate;
        self.write_configured(field, rate)
    }

    /// Set the tilt engine rate code, at most 3
    pub fn set_tilt_data_rate(&mut self, rate: u8) -> Result<(), Error<T::Error>> {
        let field = self.motion()?.tilt_rate;
        self.write_configured(field, rate)
    }

    /// Set the wake-up engine rate code, at most 7
    pub fn set_wake_data_rate(&mut self, rate: u8) -> Result<(), Error<T::Error>> {
        let field = self.motion()?.wake_rate;
        self.write_configured(field, rate)
    }

    /// Enable the data ready engine
    pub fn enable_data_engine(&mut self, enable: bool) -> Result<(), Error<T::Error>> {
        for field in self.ll.map().data_engine {
            self.write_configured(*field, enable as u8)?;
        }
        Ok(())
    }

    pub fn enable_tap_engine(&mut self, enable: bool) -> Result<(), Error<T::Error>> {
        let field = self.motion()?.tap_engine;
        self.write_configured(field, enable as u8)
    }

    pub fn enable_tilt_engine(&mut self, enable: bool) -> Result<(), Error<T::Error>> {
        let field = self.motion()?.tilt_engine;
        self.write_configured(field, enable as u8)
    }

    pub fn enable_wake_engine(&mut self, enable: bool) -> Result<(), Error<T::Error>> {
        let field = self.motion()?.wake_engine;
        self.write_configured(field, enable as u8)
    }

    /// Enable the back-to-sleep engine
    pub fn enable_sleep_engine(&mut self, enable: bool) -> Result<(), Error<T::Error>> {
        let field = self.motion()?.sleep_engine;
        self.write_configured(field, enable as u8)
    }

    /// Report single taps with their direction
    pub fn enable_direction_tap_interrupt(&mut self, enable: bool) -> Result<(), Error<T::Error>> {
        let field = self.motion()?.direction_tap;
        self.write_configured(field, enable as u8)
    }

    pub fn enable_double_tap_interrupt(&mut self, enable: bool) -> Result<(), Error<T::Error>> {
        let field = self.motion()?.double_tap;
        self.write_configured(field, enable as u8)
    }

    /// Force the wake state
    pub fn force_wake(&mut self) -> Result<(), Error<T::Error>> {
        let field = self.motion()?.force_wake;
        self.write_configured(field, 1)
    }

    /// Force the sleep state
    pub fn force_sleep(&mut self) -> Result<(), Error<T::Error>> {
        let field = self.motion()?.force_sleep;
        self.write_configured(field, 1)
    }

    /// Apply a named configuration
    ///
    /// The part is held in standby while the profile is written and put into
    /// operating mode at the end. The first failing step aborts the sequence
    /// and its error is returned. A part that was operating before the call
    /// is then switched back to operating, a failure to do so is only logged.
    pub fn initialize(&mut self, profile: Profile) -> Result<(), Error<T::Error>> {
        if profile == Profile::Buffer && self.ll.map().buffer.is_none() {
            return Err(Error::Unsupported);
        }
        debug!("applying profile {}", profile);

        let prior = self.power_state()?;
        let result = self.apply_profile(profile);
        if result.is_err()
            && prior == PowerState::Operating
            && self.enable_accel(true).is_err()
        {
            warn!("failed to restore the power state");
        }
        result
    }

    fn apply_profile(&mut self, profile: Profile) -> Result<(), Error<T::Error>> {
        let map = self.ll.map();

        self.enable_accel(false)?;
        if let Some(field) = map.high_performance {
            self.write_configured(field, 1)?;
        }
        if let Some(motion) = map.motion {
            self.write_configured(motion.tap_engine, 0)?;
            self.write_configured(motion.tilt_engine, 0)?;
        }
        let lowest = self.ll.descriptor().lowest_range().range;
        self.set_range(lowest)?;

        match profile {
            Profile::Default => self.enable_data_engine(false)?,
            Profile::SoftwareInterrupt => self.enable_data_engine(true)?,
            Profile::Interrupt => {
                if map.interrupts.is_some() {
                    self.enable_phys_interrupt(true, 1)?;
                    self.route_hardware_interrupt(route::DATA_READY, 1)?;
                }
                self.enable_data_engine(true)?;
            }
            Profile::Buffer => {
                self.enable_phys_interrupt(true, 1)?;
                self.route_hardware_interrupt(route::BUFFER_FULL, 1)?;
                self.set_buffer_operation_mode(BufferMode::Fifo)?;
                self.set_buffer_resolution(BufferResolution::SixteenBit)?;
                self.enable_buffer_interrupt(true)?;
                self.enable_data_engine(true)?;
            }
        }

        self.enable_accel(true)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::chip::Chip;
    use crate::register::{kx13x, qma6100p};
    use crate::testing::{ready, MockError, MockTransport};

    #[test]
    fn test_set_range_wraps_in_standby() {
        let transport = MockTransport::new().with_reg(kx13x::CNTL1, 0xC0);
        let mut triax = ready(transport, Chip::Kx134);

        triax.set_range(RangeCode::G32).unwrap();
        assert_eq!(triax.range(), Some(RangeCode::G32));
        assert_eq!(triax.cached_power_state(), Some(PowerState::Operating));

        let transport = triax.release();
        assert_eq!(transport.writes_to(kx13x::CNTL1), [0x40, 0x50, 0xD0]);
    }

    #[test]
    fn test_set_range_in_standby_writes_once() {
        let transport = MockTransport::new().with_reg(kx13x::CNTL1, 0x40);
        let mut triax = ready(transport, Chip::Kx132);

        triax.set_range(RangeCode::G16).unwrap();

        let transport = triax.release();
        assert_eq!(transport.writes_to(kx13x::CNTL1), [0x58]);
    }

    #[test]
    fn test_set_range_round_trips_every_supported_range() {
        for chip in [Chip::Qma6100p, Chip::Kx132, Chip::Kx134] {
            let mut triax = ready(MockTransport::new(), chip);
            for entry in chip.descriptor().ranges {
                triax.set_range(entry.range).unwrap();
                assert_eq!(triax.range(), Some(entry.range));
                assert_eq!(triax.read_range().unwrap(), entry.range);
            }
        }
    }

    #[test]
    fn test_set_range_rejects_unsupported_range() {
        let mut triax = ready(MockTransport::new(), Chip::Kx134);
        triax.set_range(RangeCode::G8).unwrap();
        triax.ll().transport_mut().writes.clear();

        assert_eq!(triax.set_range(RangeCode::G2), Err(Error::InvalidArgument));
        assert_eq!(triax.range(), Some(RangeCode::G8));
        assert!(triax.release().writes.is_empty());
    }

    #[test]
    fn test_failed_write_restores_power() {
        let mut transport = MockTransport::new().with_reg(qma6100p::PM, 0x80);
        transport.fail_write = Some(qma6100p::FSR);
        let mut triax = ready(transport, Chip::Qma6100p);

        assert_eq!(
            triax.set_range(RangeCode::G4),
            Err(Error::Bus(MockError))
        );
        assert_eq!(triax.range(), None);

        let transport = triax.release();
        assert_eq!(transport.writes_to(qma6100p::PM), [0x00, 0x80]);
        assert_eq!(transport.regs[qma6100p::PM as usize], 0x80);
    }

    #[test]
    fn test_failed_write_drops_previous_range() {
        let mut triax = ready(MockTransport::new(), Chip::Qma6100p);
        assert_eq!(triax.set_range(RangeCode::G2), Ok(()));
        assert_eq!(triax.range(), Some(RangeCode::G2));

        triax.ll().transport_mut().fail_write = Some(qma6100p::FSR);
        assert_eq!(
            triax.set_range(RangeCode::G4),
            Err(Error::Bus(MockError))
        );
        assert_eq!(triax.range(), None);
    }

    #[test]
    fn test_rate_limits() {
        let mut triax = ready(MockTransport::new(), Chip::Kx132);

        assert_eq!(triax.set_output_data_rate(15), Ok(()));
        assert_eq!(triax.set_output_data_rate(16), Err(Error::InvalidArgument));
        assert_eq!(triax.set_tap_data_rate(7), Ok(()));
        assert_eq!(triax.set_tap_data_rate(8), Err(Error::InvalidArgument));
        assert_eq!(triax.set_tilt_data_rate(3), Ok(()));
        assert_eq!(triax.set_tilt_data_rate(4), Err(Error::InvalidArgument));
        assert_eq!(triax.set_wake_data_rate(7), Ok(()));
        assert_eq!(triax.set_wake_data_rate(8), Err(Error::InvalidArgument));

        let transport = triax.release();
        assert_eq!(transport.regs[kx13x::ODCNTL as usize], 0x0F);
        assert_eq!(transport.regs[kx13x::CNTL3 as usize], 0xFF);
    }

    #[test]
    fn test_output_data_rate_hz() {
        let transport = MockTransport::new().with_reg(kx13x::ODCNTL, 0x06);
        let mut triax = ready(transport, Chip::Kx134);

        let hz = triax.output_data_rate_hz().unwrap();
        assert!((hz - 49.984).abs() < 1e-3);
    }

    #[test]
    fn test_motion_engines_unsupported_on_qma6100p() {
        let mut triax = ready(MockTransport::new(), Chip::Qma6100p);

        assert_eq!(triax.set_tap_data_rate(1), Err(Error::Unsupported));
        assert_eq!(triax.enable_wake_engine(true), Err(Error::Unsupported));
        assert!(triax.release().writes.is_empty());
    }

    #[test]
    fn test_motion_engines() {
        let transport = MockTransport::new().with_reg(kx13x::CNTL1, 0x80);
        let mut triax = ready(transport, Chip::Kx134);

        triax.enable_tap_engine(true).unwrap();
        triax.enable_wake_engine(true).unwrap();
        triax.enable_double_tap_interrupt(true).unwrap();
        triax.force_wake().unwrap();

        let transport = triax.release();
        assert_eq!(transport.regs[kx13x::CNTL1 as usize], 0x84);
        assert_eq!(transport.regs[kx13x::CNTL4 as usize], 0x20);
        assert_eq!(transport.regs[kx13x::TDTRC as usize], 0x02);
        assert_eq!(transport.regs[kx13x::CNTL5 as usize], 0x02);
    }

    #[test]
    fn test_initialize_default() {
        let mut triax = ready(MockTransport::new(), Chip::Kx132);

        triax.initialize(Profile::Default).unwrap();
        assert_eq!(triax.range(), Some(RangeCode::G2));
        assert_eq!(triax.cached_power_state(), Some(PowerState::Operating));

        let transport = triax.release();
        assert_eq!(transport.regs[kx13x::CNTL1 as usize], 0xC0);
    }

    #[test]
    fn test_initialize_interrupt() {
        let mut triax = ready(MockTransport::new(), Chip::Kx134);

        triax.initialize(Profile::Interrupt).unwrap();
        assert_eq!(triax.range(), Some(RangeCode::G8));

        let transport = triax.release();
        assert_eq!(transport.regs[kx13x::CNTL1 as usize], 0xE0);
        assert_eq!(transport.regs[kx13x::INC1 as usize], 0x20);
        assert_eq!(transport.regs[kx13x::INC4 as usize], route::DATA_READY);
    }

    #[test]
    fn test_initialize_buffer() {
        let mut triax = ready(MockTransport::new(), Chip::Kx134);

        triax.initialize(Profile::Buffer).unwrap();

        let transport = triax.release();
        assert_eq!(transport.regs[kx13x::CNTL1 as usize], 0xE0);
        assert_eq!(transport.regs[kx13x::INC4 as usize], route::BUFFER_FULL);
        assert_eq!(transport.regs[kx13x::BUF_CNTL2 as usize], 0xE0);
    }

    #[test]
    fn test_initialize_qma6100p() {
        let mut triax = ready(MockTransport::new(), Chip::Qma6100p);

        assert_eq!(triax.initialize(Profile::Buffer), Err(Error::Unsupported));
        assert!(triax.ll().transport_mut().writes.is_empty());

        triax.initialize(Profile::Interrupt).unwrap();
        assert_eq!(triax.range(), Some(RangeCode::G2));

        let transport = triax.release();
        assert_eq!(transport.regs[qma6100p::PM as usize], 0x80);
        assert_eq!(transport.regs[qma6100p::FSR as usize], 0b0001);
        assert_eq!(transport.regs[qma6100p::INT_EN1 as usize], 0x10);
        assert_eq!(transport.regs[qma6100p::INT_MAP1 as usize], 0x10);
    }

    #[test]
    fn test_initialize_aborts_on_first_error() {
        let mut transport = MockTransport::new();
        transport.fail_write = Some(kx13x::INC1);
        let mut triax = ready(transport, Chip::Kx132);

        assert_eq!(
            triax.initialize(Profile::Interrupt),
            Err(Error::Bus(MockError))
        );

        let transport = triax.release();
        assert_eq!(transport.regs[kx13x::CNTL1 as usize] & 0x80, 0);
        assert!(transport.writes_to(kx13x::INC4).is_empty());
    }

    #[test]
    fn test_initialize_failure_restores_operating_part() {
        let mut transport = MockTransport::new().with_reg(kx13x::CNTL1, 0x80);
        transport.fail_write = Some(kx13x::INC4);
        let mut triax = ready(transport, Chip::Kx134);

        assert_eq!(
            triax.initialize(Profile::Interrupt),
            Err(Error::Bus(MockError))
        );
        assert_eq!(triax.cached_power_state(), Some(PowerState::Operating));

        let transport = triax.release();
        assert_eq!(transport.regs[kx13x::CNTL1 as usize] & 0x80, 0x80);
        assert_eq!(transport.writes_to(kx13x::CNTL1).first(), Some(&0x00));
    }
}
