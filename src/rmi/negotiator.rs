// Licensed under the Apache-2.0 license

//! Command-code negotiation.
//!
//! Turns `(rmi_address, byte_count, direction)` into an SMBus command code,
//! reusing a binding from the [`MappingTable`] when one fits and otherwise
//! asking the device for a new one with a map-write.

use crate::common::Logger;
use crate::rmi::error::Error;
use crate::rmi::mapping_table::{MappingEntry, MappingTable};
use crate::smbus::{SmbusBlockAccess, SMB_MAX_COUNT};
use spin::Mutex;
use zerocopy::IntoBytes;

/// Command code of the map-write for slot 0; slot `n` is written at
/// `RMI_SMB2_MAP_COMMAND_BASE + n`.
pub const RMI_SMB2_MAP_COMMAND_BASE: u8 = 0x80;

pub struct Negotiator<'a, B: SmbusBlockAccess> {
    bus: &'a B,
    table: &'a Mutex<MappingTable>,
}

impl<'a, B: SmbusBlockAccess> Negotiator<'a, B> {
    pub fn new(bus: &'a B, table: &'a Mutex<MappingTable>) -> Self {
        Self { bus, table }
    }

    /// Command code able to carry `byte_count` bytes at `rmi_address`.
    ///
    /// The mapping-table lock is held for the whole lookup and, on a miss,
    /// across the map-write so that the host copy and the device never
    /// disagree about a slot.
    ///
    /// # Errors
    ///
    /// * `Error::InvalidLength` if `byte_count` is 0 or above 32; the bus is
    ///   not touched.
    /// * `Error::CommandCodeUnavailable` if the map-write fails. The slot it
    ///   targeted is cleared and the cursor still advances.
    pub fn command_code<L: Logger>(
        &self,
        logger: &mut L,
        rmi_address: u16,
        byte_count: usize,
        is_read: bool,
    ) -> Result<u8, Error<B::Error>> {
        if byte_count == 0 || byte_count > SMB_MAX_COUNT {
            return Err(Error::InvalidLength(byte_count));
        }
        let count = u8::try_from(byte_count).map_err(|_| Error::InvalidLength(byte_count))?;

        let mut table = self.table.lock();
        if let Some(slot) = table.find(rmi_address, count, is_read) {
            return Ok(slot);
        }

        let slot = table.cursor();
        if let Some(evicted) = table.entry(slot).filter(|e| e.is_live()) {
            logger.debug(format_args!(
                "evicting 0x{:04x} from command code {slot}",
                evicted.rmi_address()
            ));
        }

        let entry = MappingEntry::new(rmi_address, count, !is_read);
        match self
            .bus
            .block_write(RMI_SMB2_MAP_COMMAND_BASE + slot, entry.as_bytes())
        {
            Ok(()) => {
                table.insert(entry);
                logger.debug(format_args!(
                    "mapped 0x{rmi_address:04x} ({count} bytes, {}) to command code {slot}",
                    if is_read { "r" } else { "rw" }
                ));
                Ok(slot)
            }
            Err(e) => {
                table.insert(MappingEntry::EMPTY);
                logger.error(format_args!(
                    "map write for 0x{rmi_address:04x} to slot {slot} failed: {e:?}"
                ));
                Err(Error::CommandCodeUnavailable(e))
            }
        }
    }
}
