use bytemuck::{AnyBitPattern, NoUninit};

/// Raw acceleration counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

/// Acceleration in g
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhysicalSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RawSample {
    /// Scale every axis by `scale` g per count
    pub fn scale(&self, scale: f32) -> PhysicalSample {
        PhysicalSample {
            x: self.x as f32 * scale,
            y: self.y as f32 * scale,
            z: self.z as f32 * scale,
        }
    }
}

/// Width of the samples stored in the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferResolution {
    EightBit,
    SixteenBit,
}

impl BufferResolution {
    pub(crate) fn from_bit(bit: u8) -> Self {
        if bit == 0 {
            BufferResolution::EightBit
        } else {
            BufferResolution::SixteenBit
        }
    }

    pub(crate) fn bit(self) -> u8 {
        match self {
            BufferResolution::EightBit => 0,
            BufferResolution::SixteenBit => 1,
        }
    }

    /// Largest watermark threshold the buffer accepts at this width
    pub fn max_threshold(self) -> u8 {
        match self {
            BufferResolution::EightBit => 171,
            BufferResolution::SixteenBit => 86,
        }
    }

    /// Bytes one X, Y, Z sample occupies in the buffer
    pub fn frame_len(self) -> usize {
        match self {
            BufferResolution::EightBit => core::mem::size_of::<Frame8>(),
            BufferResolution::SixteenBit => core::mem::size_of::<Frame16>(),
        }
    }
}

/// Six bytes of little-endian X, Y, Z as found in the output registers and
/// in 16 bit buffer mode
#[derive(Debug, Clone, Copy, PartialEq, NoUninit, AnyBitPattern, Default)]
#[repr(C)]
pub struct Frame16 {
    pub x_l: u8,
    pub x_h: u8,
    pub y_l: u8,
    pub y_h: u8,
    pub z_l: u8,
    pub z_h: u8,
}

impl Frame16 {
    pub fn sample(&self) -> RawSample {
        RawSample {
            x: i16::from_le_bytes([self.x_l, self.x_h]),
            y: i16::from_le_bytes([self.y_l, self.y_h]),
            z: i16::from_le_bytes([self.z_l, self.z_h]),
        }
    }
}

/// Three bytes of X, Y, Z in 8 bit buffer mode
///
/// Each byte is the high byte of the 16 bit reading, so the sample keeps the
/// same full scale as 16 bit data.
#[derive(Debug, Clone, Copy, PartialEq, NoUninit, AnyBitPattern, Default)]
#[repr(C)]
pub struct Frame8 {
    pub x: u8,
    pub y: u8,
    pub z: u8,
}

impl Frame8 {
    pub fn sample(&self) -> RawSample {
        RawSample {
            x: i16::from_be_bytes([self.x, 0]),
            y: i16::from_be_bytes([self.y, 0]),
            z: i16::from_be_bytes([self.z, 0]),
        }
    }
}

const _FRAME16_SIZE_CHECK: usize = (core::mem::size_of::<Frame16>() == 6) as usize - 1;
const _FRAME8_SIZE_CHECK: usize = (core::mem::size_of::<Frame8>() == 3) as usize - 1;
