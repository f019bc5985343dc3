use crate::chip::{Chip, ChipDescriptor, RegisterMap};
use crate::interface::Transport;
use crate::register::Field;
use crate::Error;

/// Low level register access
///
/// Owns the transport and knows the register layout of the chip. Every field
/// write is a full read-modify-write of the containing byte.
pub struct Ll<T> {
    transport: T,
    chip: Chip,
}

impl<T> Ll<T> {
    pub fn new(transport: T, chip: Chip) -> Self {
        Ll { transport, chip }
    }

    pub fn chip(&self) -> Chip {
        self.chip
    }

    pub fn descriptor(&self) -> &'static ChipDescriptor {
        self.chip.descriptor()
    }

    pub fn map(&self) -> &'static RegisterMap {
        self.chip.descriptor().map
    }

    /// Direct access to the transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Release the transport
    pub fn release(self) -> T {
        self.transport
    }
}

impl<T: Transport> Ll<T> {
    pub fn probe(&mut self) -> bool {
        self.transport.probe()
    }

    pub fn read_register(&mut self, register: u8) -> Result<u8, Error<T::Error>> {
        let mut value = [0u8];
        self.transport.read_bytes(register, &mut value)?;
        Ok(value[0])
    }

    /// Read consecutive bytes starting at `register`
    pub fn read_region(&mut self, register: u8, buffer: &mut [u8]) -> Result<(), Error<T::Error>> {
        self.transport.read_bytes(register, buffer)?;
        Ok(())
    }

    pub fn write_register(&mut self, register: u8, value: u8) -> Result<(), Error<T::Error>> {
        self.transport.write_byte(register, value)?;
        Ok(())
    }

    pub fn read_field(&mut self, field: Field) -> Result<u8, Error<T::Error>> {
        let byte = self.read_register(field.register)?;
        Ok(field.decode(byte))
    }

    /// Read-modify-write `field`
    ///
    /// Values wider than the field are rejected before touching the bus. The
    /// standby requirement of gated fields is not handled here.
    pub fn write_field(&mut self, field: Field, value: u8) -> Result<(), Error<T::Error>> {
        if value > field.max() {
            return Err(Error::InvalidArgument);
        }
        let byte = self.read_register(field.register)?;
        let byte = field.encode(byte, value).ok_or(Error::InvalidArgument)?;
        self.write_register(field.register, byte)
    }
}
