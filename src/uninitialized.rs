use crate::chip::Chip;
use crate::interface::Transport;
use crate::{Error, Ready, Triax, Uninitialized};

impl<T> Triax<T, Uninitialized> {
    pub fn new(transport: T, chip: Chip) -> Self {
        Triax {
            ll: crate::ll::Ll::new(transport, chip),
            range: None,
            power: None,
            _state: Uninitialized,
        }
    }

    /// Probe the bus and verify the identity register
    ///
    /// No configuration is written, apply a [`Profile`](crate::Profile)
    /// afterwards.
    pub fn init(mut self) -> Result<Triax<T, Ready>, Error<T::Error>>
    where
        T: Transport,
    {
        if !self.ll.probe() {
            warn!("no device answered the probe");
            return Err(Error::NotPresent);
        }

        let descriptor = self.ll.descriptor();
        let identity = self.ll.read_register(descriptor.map.who_am_i)?;
        if identity != descriptor.identity {
            warn!("identity mismatch: read {=u8:#x}", identity);
            return Err(Error::WrongDevice(identity));
        }
        debug!("found {=str}", descriptor.name);

        Ok(Triax {
            ll: self.ll,
            range: None,
            power: None,
            _state: Ready,
        })
    }
}
