// Licensed under the Apache-2.0 license

//! SMBus protocol constants shared by the bus adapters and the RMI transport.

/// Largest payload of a single SMBus block read or block write.
pub const SMB_MAX_COUNT: usize = 32;

/// Command code of the byte register holding the SMBus protocol version.
pub const SMB_PROTOCOL_VERSION_ADDRESS: u8 = 0xfd;

/// A block frame on the wire: command, byte count, payload.
pub const SMB_BLOCK_FRAME_SIZE: usize = SMB_MAX_COUNT + 2;
