//! Sample buffer
//!
//! The KX13X parts queue samples in an on-chip buffer that is read one frame
//! at a time through a single read port.

use crate::chip::BufferMap;
use crate::interface::Transport;
use crate::sample::BufferResolution;
use crate::{Error, Ready, Triax};

/// Buffer operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferMode {
    /// Buffer disabled, samples are read from the output registers
    Bypass,
    /// Stop collecting when full
    Fifo,
    /// Drop the oldest sample when full
    Stream,
    /// Collect around a trigger event
    Trigger,
}

impl BufferMode {
    fn code(self) -> Option<u8> {
        match self {
            BufferMode::Bypass => None,
            BufferMode::Fifo => Some(0),
            BufferMode::Stream => Some(1),
            BufferMode::Trigger => Some(2),
        }
    }
}

impl<T> Triax<T, Ready>
where
    T: Transport,
{
    pub(crate) fn buffer(&self) -> Result<BufferMap, Error<T::Error>> {
        self.ll.map().buffer.ok_or(Error::Unsupported)
    }

    /// Resolution currently configured in the buffer control register
    pub fn buffer_resolution(&mut self) -> Result<BufferResolution, Error<T::Error>> {
        let field = self.buffer()?.resolution;
        Ok(BufferResolution::from_bit(self.ll.read_field(field)?))
    }

    /// Set the watermark threshold in samples
    ///
    /// Values below 2 or above 171 are rejected. With 16 bit samples the
    /// buffer holds at most 86, larger values are clamped.
    pub fn set_buffer_threshold(&mut self, threshold: u8) -> Result<(), Error<T::Error>> {
        let buffer = self.buffer()?;
        if !(2..=BufferResolution::EightBit.max_threshold()).contains(&threshold) {
            return Err(Error::InvalidArgument);
        }
        let limit = self.buffer_resolution()?.max_threshold();
        let threshold = threshold.min(limit);
        debug!("buffer threshold {}", threshold);
        self.ll.write_register(buffer.threshold, threshold)
    }

    /// Select the buffer mode
    ///
    /// Any mode other than [`BufferMode::Bypass`] also enables the buffer.
    /// The control register is read first, a failed read aborts without
    /// writing.
    pub fn set_buffer_operation_mode(&mut self, mode: BufferMode) -> Result<(), Error<T::Error>> {
        let buffer = self.buffer()?;
        let register = buffer.mode.register;
        let byte = self.ll.read_register(register)?;
        let byte = match mode.code() {
            Some(code) => buffer
                .mode
                .encode(byte, code)
                .and_then(|byte| buffer.enable.encode(byte, 1)),
            None => buffer.enable.encode(byte, 0),
        }
        .ok_or(Error::InvalidArgument)?;
        debug!("buffer mode {}", mode);
        self.ll.write_register(register, byte)
    }

    pub fn set_buffer_resolution(
        &mut self,
        resolution: BufferResolution,
    ) -> Result<(), Error<T::Error>> {
        let field = self.buffer()?.resolution;
        self.write_configured(field, resolution.bit())
    }

    /// Enable the buffer full interrupt
    pub fn enable_buffer_interrupt(&mut self, enable: bool) -> Result<(), Error<T::Error>> {
        let field = self.buffer()?.interrupt;
        self.write_configured(field, enable as u8)
    }

    pub fn enable_sample_buffer(&mut self, enable: bool) -> Result<(), Error<T::Error>> {
        let field = self.buffer()?.enable;
        self.write_configured(field, enable as u8)
    }

    /// Number of bytes held in the buffer
    ///
    /// One sample takes [`BufferResolution::frame_len`] bytes.
    pub fn sample_level(&mut self) -> Result<u16, Error<T::Error>> {
        let register = self.buffer()?.status;
        let mut level = [0u8; 2];
        self.ll.read_region(register, &mut level)?;
        Ok(level[0] as u16 | ((level[1] & 0x03) as u16) << 8)
    }

    /// Drop every sample in the buffer
    pub fn clear_buffer(&mut self) -> Result<(), Error<T::Error>> {
        let register = self.buffer()?.clear;
        self.ll.write_register(register, 1)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::chip::Chip;
    use crate::register::kx13x;
    use crate::testing::{ready, MockError, MockTransport};

    #[test]
    fn test_threshold_bounds() {
        let mut triax = ready(MockTransport::new(), Chip::Kx132);

        assert_eq!(triax.set_buffer_threshold(1), Err(Error::InvalidArgument));
        assert_eq!(triax.set_buffer_threshold(172), Err(Error::InvalidArgument));
        assert!(triax.ll().transport_mut().writes.is_empty());

        triax.set_buffer_threshold(2).unwrap();
        triax.set_buffer_threshold(171).unwrap();
        assert_eq!(triax.release().writes_to(kx13x::BUF_CNTL1), [2, 171]);
    }

    #[test]
    fn test_threshold_clamped_at_sixteen_bit() {
        let transport = MockTransport::new().with_reg(kx13x::BUF_CNTL2, 0x40);
        let mut triax = ready(transport, Chip::Kx134);
        triax.set_buffer_threshold(90).unwrap();
        assert_eq!(triax.release().writes_to(kx13x::BUF_CNTL1), [86]);

        let transport = MockTransport::new().with_reg(kx13x::BUF_CNTL2, 0x00);
        let mut triax = ready(transport, Chip::Kx134);
        triax.set_buffer_threshold(90).unwrap();
        assert_eq!(triax.release().writes_to(kx13x::BUF_CNTL1), [90]);
    }

    #[test]
    fn test_operation_mode() {
        let transport = MockTransport::new().with_reg(kx13x::BUF_CNTL2, 0x60);
        let mut triax = ready(transport, Chip::Kx132);

        triax.set_buffer_operation_mode(BufferMode::Stream).unwrap();
        assert_eq!(triax.ll().transport_mut().regs[kx13x::BUF_CNTL2 as usize], 0xE1);

        triax.set_buffer_operation_mode(BufferMode::Trigger).unwrap();
        assert_eq!(triax.ll().transport_mut().regs[kx13x::BUF_CNTL2 as usize], 0xE2);

        triax.set_buffer_operation_mode(BufferMode::Bypass).unwrap();
        assert_eq!(triax.ll().transport_mut().regs[kx13x::BUF_CNTL2 as usize], 0x62);
    }

    #[test]
    fn test_operation_mode_read_failure_is_an_error() {
        let mut transport = MockTransport::new();
        transport.fail_read = Some(kx13x::BUF_CNTL2);
        let mut triax = ready(transport, Chip::Kx132);

        assert_eq!(
            triax.set_buffer_operation_mode(BufferMode::Fifo),
            Err(Error::Bus(MockError))
        );
        assert!(triax.release().writes.is_empty());
    }

    #[test]
    fn test_sample_level() {
        let transport = MockTransport::new()
            .with_reg(kx13x::BUF_STATUS_1, 0x2C)
            .with_reg(kx13x::BUF_STATUS_1 + 1, 0xFE);
        let mut triax = ready(transport, Chip::Kx134);

        assert_eq!(triax.sample_level().unwrap(), 0x22C);
    }

    #[test]
    fn test_clear_buffer() {
        let mut triax = ready(MockTransport::new(), Chip::Kx134);

        triax.clear_buffer().unwrap();
        assert_eq!(triax.release().writes_to(kx13x::BUF_CLEAR), [1]);
    }

    #[test]
    fn test_buffer_unsupported_on_qma6100p() {
        let mut triax = ready(MockTransport::new(), Chip::Qma6100p);

        assert_eq!(triax.set_buffer_threshold(10), Err(Error::Unsupported));
        assert_eq!(triax.sample_level(), Err(Error::Unsupported));
    }
}
