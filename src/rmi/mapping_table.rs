// Licensed under the Apache-2.0 license

//! Host-side copy of the device's RMI address map.
//!
//! An SMBus RMI device exposes eight command codes whose meaning is set at
//! run time: writing a 4-byte entry to command `0x80 + slot` binds command
//! `slot` to an RMI register address. [`MappingTable`] mirrors what the host
//! has told the device, so repeated accesses to the same registers reuse a
//! binding instead of renegotiating it.
//!
//! Slots are replaced round-robin. The device indexes its own table by slot,
//! so the host must pick slots deterministically rather than by recency.

use zerocopy::byteorder::little_endian::U16;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Number of command codes the device lets the host remap.
pub const RMI_SMB2_MAP_SIZE: usize = 8;

/// Entry flag: the command code accepts block writes.
pub const RMI_SMB2_MAP_FLAGS_WE: u8 = 0x01;

/// One address binding, laid out exactly as the device expects it in a
/// map-write payload.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned,
)]
#[repr(C)]
pub struct MappingEntry {
    rmi_address: U16,
    read_count: u8,
    flags: u8,
}

impl MappingEntry {
    /// A cleared slot.
    pub const EMPTY: Self = Self {
        rmi_address: U16::ZERO,
        read_count: 0,
        flags: 0,
    };

    #[must_use]
    pub fn new(rmi_address: u16, read_count: u8, write_enabled: bool) -> Self {
        Self {
            rmi_address: U16::new(rmi_address),
            read_count,
            flags: if write_enabled { RMI_SMB2_MAP_FLAGS_WE } else { 0 },
        }
    }

    #[must_use]
    pub fn rmi_address(&self) -> u16 {
        self.rmi_address.get()
    }

    #[must_use]
    pub const fn read_count(&self) -> u8 {
        self.read_count
    }

    #[must_use]
    pub const fn flags(&self) -> u8 {
        self.flags
    }

    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.read_count != 0
    }

    #[must_use]
    pub const fn write_enabled(&self) -> bool {
        self.flags & RMI_SMB2_MAP_FLAGS_WE != 0
    }

    /// Whether this binding can carry a transfer of `byte_count` bytes at
    /// `rmi_address` in the given direction.
    #[must_use]
    pub fn covers(&self, rmi_address: u16, byte_count: u8, is_read: bool) -> bool {
        self.is_live()
            && self.rmi_address() == rmi_address
            && self.read_count >= byte_count
            && (is_read || self.write_enabled())
    }
}

/// Fixed-capacity table of [`MappingEntry`] slots with a round-robin cursor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MappingTable {
    entries: [MappingEntry; RMI_SMB2_MAP_SIZE],
    cursor: usize,
}

impl Default for MappingTable {
    fn default() -> Self {
        Self::new()
    }
}

impl MappingTable {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: [MappingEntry::EMPTY; RMI_SMB2_MAP_SIZE],
            cursor: 0,
        }
    }

    /// Slot of the first entry able to carry the transfer.
    #[must_use]
    pub fn find(&self, rmi_address: u16, byte_count: u8, is_read: bool) -> Option<u8> {
        self.entries
            .iter()
            .position(|e| e.covers(rmi_address, byte_count, is_read))
            .and_then(|slot| u8::try_from(slot).ok())
    }

    /// Slot the next [`insert`](Self::insert) will overwrite.
    #[must_use]
    pub fn cursor(&self) -> u8 {
        // cursor < RMI_SMB2_MAP_SIZE
        self.cursor as u8
    }

    /// Replace the slot at the cursor with `entry`, advance the cursor and
    /// return the slot used.
    ///
    /// Any other live entry for the same address is cleared so that one
    /// address never has two bindings.
    pub fn insert(&mut self, entry: MappingEntry) -> u8 {
        let slot = self.cursor;
        if entry.is_live() {
            for (index, stale) in self.entries.iter_mut().enumerate() {
                if index != slot && stale.is_live() && stale.rmi_address() == entry.rmi_address() {
                    *stale = MappingEntry::EMPTY;
                }
            }
        }
        if let Some(target) = self.entries.get_mut(slot) {
            *target = entry;
        }
        self.cursor = (slot + 1) % RMI_SMB2_MAP_SIZE;
        slot as u8
    }

    /// Forget every binding. The cursor keeps its position.
    pub fn reset(&mut self) {
        self.entries = [MappingEntry::EMPTY; RMI_SMB2_MAP_SIZE];
    }

    #[must_use]
    pub fn entry(&self, slot: u8) -> Option<&MappingEntry> {
        self.entries.get(usize::from(slot))
    }

    pub fn iter(&self) -> impl Iterator<Item = &MappingEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_live()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn assert_unique_addresses(table: &MappingTable) {
        let live: Vec<u16> = table
            .iter()
            .filter(|e| e.is_live())
            .map(MappingEntry::rmi_address)
            .collect();
        for (i, a) in live.iter().enumerate() {
            assert!(!live[i + 1..].contains(a), "address {a:#06x} mapped twice");
        }
    }

    #[test]
    fn test_entry_wire_layout() {
        let entry = MappingEntry::new(0x1234, 4, true);
        assert_eq!(entry.as_bytes(), &hex!("3412 04 01"));

        let decoded = MappingEntry::read_from_bytes(&hex!("0002 10 00")).unwrap();
        assert_eq!(decoded.rmi_address(), 0x0200);
        assert_eq!(decoded.read_count(), 16);
        assert!(!decoded.write_enabled());
    }

    #[test]
    fn test_new_table_is_empty() {
        let table = MappingTable::new();
        assert_eq!(table.live_count(), 0);
        assert_eq!(table.cursor(), 0);
        assert_eq!(table.find(0x0000, 1, true), None);
    }

    #[test]
    fn test_insert_advances_cursor_by_one() {
        let mut table = MappingTable::new();
        for n in 0..20u16 {
            let before = table.cursor();
            let slot = table.insert(MappingEntry::new(0x100 + n, 1, false));
            assert_eq!(slot, before);
            assert_eq!(table.cursor(), (before + 1) % RMI_SMB2_MAP_SIZE as u8);
            assert!(table.live_count() <= RMI_SMB2_MAP_SIZE);
        }
    }

    #[test]
    fn test_ninth_insert_evicts_slot_zero() {
        let mut table = MappingTable::new();
        for n in 0..8u16 {
            table.insert(MappingEntry::new(0x1000 + n, 2, false));
        }
        assert_eq!(table.live_count(), 8);

        let slot = table.insert(MappingEntry::new(0x2000, 2, false));
        assert_eq!(slot, 0);
        assert_eq!(table.find(0x1000, 2, true), None);
        assert_eq!(table.find(0x1007, 2, true), Some(7));
        assert_eq!(table.find(0x2000, 2, true), Some(0));
    }

    #[test]
    fn test_find_rules() {
        let mut table = MappingTable::new();
        table.insert(MappingEntry::new(0x0400, 8, false));
        table.insert(MappingEntry::new(0x0500, 2, true));

        // Reads are served by any binding at least as wide.
        assert_eq!(table.find(0x0400, 8, true), Some(0));
        assert_eq!(table.find(0x0400, 3, true), Some(0));
        assert_eq!(table.find(0x0400, 9, true), None);

        // Writes need the write-enable flag.
        assert_eq!(table.find(0x0400, 1, false), None);
        assert_eq!(table.find(0x0500, 2, false), Some(1));
        assert_eq!(table.find(0x0500, 1, true), Some(1));
    }

    #[test]
    fn test_insert_clears_stale_binding_for_same_address() {
        let mut table = MappingTable::new();
        table.insert(MappingEntry::new(0x0400, 1, false));
        table.insert(MappingEntry::new(0x0401, 1, false));
        table.insert(MappingEntry::new(0x0400, 1, true));

        assert_unique_addresses(&table);
        assert_eq!(table.live_count(), 2);
        assert_eq!(table.find(0x0400, 1, false), Some(2));
        assert!(!table.entry(0).unwrap().is_live());
    }

    #[test]
    fn test_reset_clears_entries_only() {
        let mut table = MappingTable::new();
        table.insert(MappingEntry::new(0x0001, 1, false));
        table.insert(MappingEntry::new(0x0002, 1, false));
        table.reset();

        assert_eq!(table.live_count(), 0);
        assert_eq!(table.cursor(), 2);
        assert!(table.iter().all(|e| *e == MappingEntry::EMPTY));
    }
}
