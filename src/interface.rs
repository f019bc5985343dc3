//! Register transports
//!
//! The driver only needs byte-level access to a register address. The bus
//! address (for I2C) or chip select (for SPI) is owned by the adapter.

use embedded_hal::i2c::{self, I2c};
use embedded_hal::spi::{self, SpiDevice};

/// Byte-level register access used by the driver core
pub trait Transport {
    /// Error reported by the underlying bus
    type Error: core::fmt::Debug;

    /// Check whether a device responds on the bus
    fn probe(&mut self) -> bool;

    /// Read `buffer.len()` bytes starting at `register`
    fn read_bytes(&mut self, register: u8, buffer: &mut [u8]) -> Result<(), Self::Error>;

    /// Write `bytes` starting at `register`
    fn write_bytes(&mut self, register: u8, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Write a single register
    fn write_byte(&mut self, register: u8, value: u8) -> Result<(), Self::Error> {
        self.write_bytes(register, &[value])
    }
}

/// I2C register transport
pub struct I2cTransport<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> I2cTransport<I2C> {
    /// Create a transport talking to the 7-bit `address`
    pub const fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// The 7-bit bus address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Release the I2C bus
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> Transport for I2cTransport<I2C>
where
    I2C: I2c,
{
    type Error = I2C::Error;

    fn probe(&mut self) -> bool {
        self.i2c.write(self.address, &[]).is_ok()
    }

    fn read_bytes(&mut self, register: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.write_read(self.address, &[register], buffer)
    }

    fn write_bytes(&mut self, register: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        let header = [register];
        let mut ops = [i2c::Operation::Write(&header), i2c::Operation::Write(bytes)];
        self.i2c.transaction(self.address, &mut ops)
    }

    fn write_byte(&mut self, register: u8, value: u8) -> Result<(), Self::Error> {
        self.i2c.write(self.address, &[register, value])
    }
}

const SPI_READ: u8 = 0x80;

/// SPI register transport
///
/// Reads set the MSB of the register address, writes clear it.
pub struct SpiTransport<SPI> {
    spi: SPI,
}

impl<SPI> SpiTransport<SPI> {
    pub const fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Release the SPI device
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI> Transport for SpiTransport<SPI>
where
    SPI: SpiDevice,
{
    type Error = SPI::Error;

    // Chip select is the only addressing on SPI, identity is checked later.
    fn probe(&mut self) -> bool {
        true
    }

    fn read_bytes(&mut self, register: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        let header = [register | SPI_READ];
        let mut ops = [spi::Operation::Write(&header), spi::Operation::Read(buffer)];
        self.spi.transaction(&mut ops)
    }

    fn write_bytes(&mut self, register: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        let header = [register & !SPI_READ];
        let mut ops = [spi::Operation::Write(&header), spi::Operation::Write(bytes)];
        self.spi.transaction(&mut ops)
    }

    fn write_byte(&mut self, register: u8, value: u8) -> Result<(), Self::Error> {
        self.spi.write(&[register & !SPI_READ, value])
    }
}
