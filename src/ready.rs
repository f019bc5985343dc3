use crate::interface::Transport;
use crate::sample::{BufferResolution, Frame16, Frame8, PhysicalSample, RawSample};
use crate::{Error, Ready, Triax};

impl<T> Triax<T, Ready>
where
    T: Transport,
{
    /// Read one sample
    ///
    /// Checks the buffer control register on every call. If the buffer is
    /// enabled the sample comes from the buffer at the configured width,
    /// otherwise from the output registers.
    pub fn raw_accel(&mut self) -> Result<RawSample, Error<T::Error>> {
        if let Some(buffer) = self.ll.map().buffer {
            let control = self.ll.read_register(buffer.enable.register)?;
            if buffer.enable.decode(control) != 0 {
                let resolution = BufferResolution::from_bit(buffer.resolution.decode(control));
                return self.read_buffer_sample(resolution);
            }
        }
        self.raw_register_sample()
    }

    /// Read the output registers
    pub fn raw_register_sample(&mut self) -> Result<RawSample, Error<T::Error>> {
        let register = self.ll.map().output;
        let mut frame = Frame16::default();
        self.ll.read_region(register, bytemuck::bytes_of_mut(&mut frame))?;
        Ok(frame.sample())
    }

    /// Pop one sample from the buffer, assuming `resolution`
    pub fn read_buffer_sample(
        &mut self,
        resolution: BufferResolution,
    ) -> Result<RawSample, Error<T::Error>> {
        let register = self.buffer()?.data;
        match resolution {
            BufferResolution::SixteenBit => {
                let mut frame = Frame16::default();
                self.ll.read_region(register, bytemuck::bytes_of_mut(&mut frame))?;
                Ok(frame.sample())
            }
            BufferResolution::EightBit => {
                let mut frame = Frame8::default();
                self.ll.read_region(register, bytemuck::bytes_of_mut(&mut frame))?;
                Ok(frame.sample())
            }
        }
    }

    /// Read up to `samples.len()` samples from the buffer
    ///
    /// Returns the number of samples written.
    pub fn drain_buffer(&mut self, samples: &mut [RawSample]) -> Result<usize, Error<T::Error>> {
        let resolution = self.buffer_resolution()?;
        let available = self.sample_level()? as usize / resolution.frame_len();
        let count = available.min(samples.len());
        trace!("draining {} of {} samples", count, available);

        for sample in samples[..count].iter_mut() {
            *sample = self.read_buffer_sample(resolution)?;
        }
        Ok(count)
    }

    /// Count to g factor of the configured range
    ///
    /// Reads the range from the device if it is not cached yet.
    pub fn scale(&mut self) -> Result<f32, Error<T::Error>> {
        let range = match self.range {
            Some(range) => range,
            None => self.read_range()?,
        };
        self.ll
            .descriptor()
            .range(range)
            .map(|entry| entry.scale)
            .ok_or(Error::InvalidState)
    }

    /// Convert raw counts to g using the configured range
    pub fn convert(&mut self, raw: RawSample) -> Result<PhysicalSample, Error<T::Error>> {
        let scale = self.scale()?;
        Ok(raw.scale(scale))
    }

    /// Read one sample and convert it to g
    pub fn accel(&mut self) -> Result<PhysicalSample, Error<T::Error>> {
        let raw = self.raw_accel()?;
        self.convert(raw)
    }
}
