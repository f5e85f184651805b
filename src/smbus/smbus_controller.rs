// Licensed under the Apache-2.0 license

//! SMBus framing over an embedded-hal I2C bus.
//!
//! [`SmbusController`] turns any `embedded_hal::i2c::I2c` implementation into
//! a [`SmbusBlockAccess`] adapter for one device address. The bus handle sits
//! behind a spin lock so the adapter can be shared by reference.

use crate::smbus::common::{SMB_BLOCK_FRAME_SIZE, SMB_MAX_COUNT};
use crate::smbus::traits::SmbusBlockAccess;
use embedded_hal::i2c::{ErrorKind, I2c, Operation, SevenBitAddress};
use heapless::Vec;
use spin::Mutex;

/// Errors raised while framing SMBus transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmbusError<E> {
    /// The underlying I2C transfer failed.
    I2c(E),
    /// The device reported a block byte count above 32.
    InvalidBlockCount(u8),
    /// Payload does not fit in a single block.
    FrameOverflow,
}

impl<E: embedded_hal::i2c::Error> embedded_hal::i2c::Error for SmbusError<E> {
    fn kind(&self) -> ErrorKind {
        match self {
            SmbusError::I2c(e) => e.kind(),
            SmbusError::InvalidBlockCount(_) | SmbusError::FrameOverflow => ErrorKind::Other,
        }
    }
}

pub struct SmbusController<H: I2c> {
    hardware: Mutex<H>,
    address: SevenBitAddress,
    host_notify: bool,
}

impl<H: I2c> SmbusController<H> {
    pub fn new(hardware: H, address: SevenBitAddress) -> Self {
        Self {
            hardware: Mutex::new(hardware),
            address,
            host_notify: true,
        }
    }

    /// Declare whether the controller behind `hardware` routes host-notify.
    #[must_use]
    pub fn host_notify(mut self, supported: bool) -> Self {
        self.host_notify = supported;
        self
    }

    #[must_use]
    pub const fn address(&self) -> SevenBitAddress {
        self.address
    }

    pub fn into_inner(self) -> H {
        self.hardware.into_inner()
    }
}

impl<H: I2c> SmbusBlockAccess for SmbusController<H> {
    type Error = SmbusError<H::Error>;

    fn read_byte_data(&self, command: u8) -> Result<u8, Self::Error> {
        let mut value = [0u8; 1];
        self.hardware
            .lock()
            .write_read(self.address, &[command], &mut value)
            .map_err(SmbusError::I2c)?;
        let [byte] = value;
        Ok(byte)
    }

    fn block_read(&self, command: u8, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let wanted = buf.len().min(SMB_MAX_COUNT);
        let mut raw = [0u8; SMB_MAX_COUNT + 1];
        let frame = raw.get_mut(..=wanted).ok_or(SmbusError::FrameOverflow)?;

        self.hardware
            .lock()
            .transaction(
                self.address,
                &mut [Operation::Write(&[command]), Operation::Read(&mut *frame)],
            )
            .map_err(SmbusError::I2c)?;

        let (count, payload) = frame.split_first().ok_or(SmbusError::FrameOverflow)?;
        if usize::from(*count) > SMB_MAX_COUNT {
            return Err(SmbusError::InvalidBlockCount(*count));
        }

        let delivered = usize::from(*count).min(wanted);
        let src = payload.get(..delivered).ok_or(SmbusError::FrameOverflow)?;
        let dst = buf.get_mut(..delivered).ok_or(SmbusError::FrameOverflow)?;
        dst.copy_from_slice(src);
        Ok(delivered)
    }

    fn block_write(&self, command: u8, data: &[u8]) -> Result<(), Self::Error> {
        let count = u8::try_from(data.len()).map_err(|_| SmbusError::FrameOverflow)?;
        if data.len() > SMB_MAX_COUNT {
            return Err(SmbusError::FrameOverflow);
        }

        let mut frame: Vec<u8, SMB_BLOCK_FRAME_SIZE> = Vec::new();
        frame.push(command).map_err(|_| SmbusError::FrameOverflow)?;
        frame.push(count).map_err(|_| SmbusError::FrameOverflow)?;
        frame
            .extend_from_slice(data)
            .map_err(|()| SmbusError::FrameOverflow)?;

        self.hardware
            .lock()
            .write(self.address, &frame)
            .map_err(SmbusError::I2c)
    }

    fn host_notify_supported(&self) -> bool {
        self.host_notify
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{Error as _, ErrorType, NoAcknowledgeSource};
    use hex_literal::hex;
    use std::collections::HashMap;

    /// I2C bus with one SMBus device: byte registers, block registers and a
    /// log of every raw write.
    #[derive(Default)]
    struct FakeI2c {
        address: u8,
        bytes: HashMap<u8, u8>,
        blocks: HashMap<u8, std::vec::Vec<u8>>,
        writes: std::vec::Vec<std::vec::Vec<u8>>,
        nak: bool,
    }

    impl ErrorType for FakeI2c {
        type Error = ErrorKind;
    }

    impl I2c for FakeI2c {
        fn transaction(
            &mut self,
            address: SevenBitAddress,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.nak || address != self.address {
                return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
            }
            let mut command = None;
            for op in operations.iter_mut() {
                match op {
                    Operation::Write(bytes) => {
                        command = bytes.first().copied();
                        self.writes.push(bytes.to_vec());
                    }
                    Operation::Read(buf) => {
                        let command = command.unwrap();
                        if let Some(block) = self.blocks.get(&command) {
                            let mut frame = vec![block.len() as u8];
                            frame.extend_from_slice(block);
                            for (dst, src) in buf.iter_mut().zip(frame.iter()) {
                                *dst = *src;
                            }
                        } else {
                            buf[0] = self.bytes.get(&command).copied().unwrap_or(0);
                        }
                    }
                }
            }
            Ok(())
        }
    }

    fn controller(fake: FakeI2c) -> SmbusController<FakeI2c> {
        SmbusController::new(fake, 0x2c)
    }

    #[test]
    fn test_read_byte_data() {
        let mut fake = FakeI2c {
            address: 0x2c,
            ..Default::default()
        };
        fake.bytes.insert(0xfd, 0x01);
        let smbus = controller(fake);

        assert_eq!(smbus.read_byte_data(0xfd).unwrap(), 0x01);
    }

    #[test]
    fn test_block_write_frames_command_and_count() {
        let fake = FakeI2c {
            address: 0x2c,
            ..Default::default()
        };
        let smbus = controller(fake);

        smbus.block_write(0x83, &hex!("3412 04 01")).unwrap();

        let fake = smbus.into_inner();
        assert_eq!(fake.writes, vec![hex!("83 04 3412 04 01").to_vec()]);
    }

    #[test]
    fn test_block_write_rejects_oversized_payload() {
        let fake = FakeI2c {
            address: 0x2c,
            ..Default::default()
        };
        let smbus = controller(fake);

        let data = [0u8; SMB_MAX_COUNT + 1];
        assert_eq!(
            smbus.block_write(0x00, &data),
            Err(SmbusError::FrameOverflow)
        );
        assert!(smbus.into_inner().writes.is_empty());
    }

    #[test]
    fn test_block_read_truncates_to_buffer() {
        let mut fake = FakeI2c {
            address: 0x2c,
            ..Default::default()
        };
        fake.blocks.insert(0x02, hex!("0a0b0c0d").to_vec());
        let smbus = controller(fake);

        let mut buf = [0u8; 2];
        assert_eq!(smbus.block_read(0x02, &mut buf).unwrap(), 2);
        assert_eq!(buf, hex!("0a0b"));

        let mut buf = [0u8; 8];
        assert_eq!(smbus.block_read(0x02, &mut buf).unwrap(), 4);
        assert_eq!(&buf[..4], &hex!("0a0b0c0d"));
    }

    #[test]
    fn test_block_read_rejects_bad_count() {
        let mut fake = FakeI2c {
            address: 0x2c,
            ..Default::default()
        };
        fake.blocks.insert(0x01, vec![0u8; 40]);
        let smbus = controller(fake);

        let mut buf = [0u8; 4];
        assert_eq!(
            smbus.block_read(0x01, &mut buf),
            Err(SmbusError::InvalidBlockCount(40))
        );
    }

    #[test]
    fn test_nak_maps_to_error_kind() {
        let fake = FakeI2c {
            address: 0x2c,
            nak: true,
            ..Default::default()
        };
        let smbus = controller(fake).host_notify(false);

        let err = smbus.read_byte_data(0xfd).unwrap_err();
        assert_eq!(
            err.kind(),
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
        );
        assert!(!smbus.host_notify_supported());
    }
}
