//! Register-file mock transport and delay for unit tests
extern crate alloc;

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use embedded_hal::delay::DelayNs;

use crate::chip::Chip;
use crate::{Ready, Triax};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MockError;

/// A 256 byte register file
///
/// Reads of a register with a scripted queue pop bytes from the queue, which
/// models polled status registers and the buffer read port. Once the queue is
/// empty the register file is used.
pub(crate) struct MockTransport {
    pub regs: [u8; 256],
    pub scripted: Vec<(u8, VecDeque<u8>)>,
    pub writes: Vec<(u8, u8)>,
    pub reads: Vec<u8>,
    pub fail_read: Option<u8>,
    pub fail_write: Option<u8>,
    pub present: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        MockTransport {
            regs: [0; 256],
            scripted: Vec::new(),
            writes: Vec::new(),
            reads: Vec::new(),
            fail_read: None,
            fail_write: None,
            present: true,
        }
    }

    pub fn with_reg(mut self, register: u8, value: u8) -> Self {
        self.regs[register as usize] = value;
        self
    }

    /// Queue bytes to be returned by subsequent reads of `register`
    pub fn script(&mut self, register: u8, bytes: &[u8]) {
        match self.scripted.iter_mut().find(|(r, _)| *r == register) {
            Some((_, queue)) => queue.extend(bytes.iter().copied()),
            None => self
                .scripted
                .push((register, bytes.iter().copied().collect())),
        }
    }

    pub fn writes_to(&self, register: u8) -> Vec<u8> {
        self.writes
            .iter()
            .filter(|(r, _)| *r == register)
            .map(|(_, v)| *v)
            .collect()
    }

    pub fn reads_of(&self, register: u8) -> usize {
        self.reads.iter().filter(|r| **r == register).count()
    }

    fn next_scripted(&mut self, register: u8) -> Option<u8> {
        self.scripted
            .iter_mut()
            .find(|(r, _)| *r == register)
            .and_then(|(_, queue)| queue.pop_front())
    }
}

impl crate::interface::Transport for MockTransport {
    type Error = MockError;

    fn probe(&mut self) -> bool {
        self.present
    }

    fn read_bytes(&mut self, register: u8, buffer: &mut [u8]) -> Result<(), MockError> {
        self.reads.push(register);
        if self.fail_read == Some(register) {
            return Err(MockError);
        }
        for (i, byte) in buffer.iter_mut().enumerate() {
            *byte = match self.next_scripted(register) {
                Some(value) => value,
                None => self.regs[register.wrapping_add(i as u8) as usize],
            };
        }
        Ok(())
    }

    fn write_bytes(&mut self, register: u8, bytes: &[u8]) -> Result<(), MockError> {
        if self.fail_write == Some(register) {
            return Err(MockError);
        }
        for (i, byte) in bytes.iter().enumerate() {
            let address = register.wrapping_add(i as u8);
            self.writes.push((address, *byte));
            self.regs[address as usize] = *byte;
        }
        Ok(())
    }
}

/// Counts delay calls and the total time waited
#[derive(Debug, Default)]
pub(crate) struct MockDelay {
    pub calls: usize,
    pub total_ns: u64,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.calls += 1;
        self.total_ns += ns as u64;
    }
}

/// A ready handle over `transport` with the identity register preset
pub(crate) fn ready(mut transport: MockTransport, chip: Chip) -> Triax<MockTransport, Ready> {
    let descriptor = chip.descriptor();
    transport.regs[descriptor.map.who_am_i as usize] = descriptor.identity;
    let mut triax = Triax::new(transport, chip).init().unwrap();
    triax.ll().transport_mut().reads.clear();
    triax
}
