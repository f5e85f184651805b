// Licensed under the Apache-2.0 license

//! # SMBus Bus Primitive Traits
//!
//! The RMI transport never talks to a bus controller directly. It consumes the
//! narrow set of SMBus primitives below, which a controller driver (or the
//! embedded-hal backed [`SmbusController`](crate::smbus::SmbusController))
//! provides.
//!
//! All methods take `&self`: one adapter is shared by every session that sits
//! on the bus, and its lifetime belongs to whoever attached the device.
//! Implementations serialise physical access internally.
//!
//! ## Operations
//!
//! ```text
//! SmbusBlockAccess
//!     ├── read_byte_data   (raw byte register, version probe)
//!     ├── block_read       (count byte + up to 32 bytes)
//!     ├── block_write      (count byte + up to 32 bytes)
//!     └── host_notify_supported
//! ```

/// SMBus block and byte primitives addressed by an 8-bit command code.
///
/// # Examples
///
/// ```rust,no_run
/// use rmi_smbus::smbus::SmbusBlockAccess;
///
/// fn dump<B: SmbusBlockAccess>(bus: &B, command: u8) -> Result<(), B::Error> {
///     let mut data = [0u8; 32];
///     let count = bus.block_read(command, &mut data)?;
///     let _valid = data.get(..count);
///     Ok(())
/// }
/// ```
pub trait SmbusBlockAccess {
    /// Adapter error type; carries an embedded-hal error kind.
    type Error: embedded_hal::i2c::Error + core::fmt::Debug;

    /// SMBus "read byte data" from `command`.
    ///
    /// # Errors
    ///
    /// Returns an error if the device does not acknowledge or the link fails.
    fn read_byte_data(&self, command: u8) -> Result<u8, Self::Error>;

    /// SMBus block read from `command` into `buf`.
    ///
    /// The device reports its own byte count; at most `buf.len()` bytes are
    /// stored. Returns the number of bytes stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the transfer fails or the device reports an
    /// impossible byte count.
    fn block_read(&self, command: u8, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// SMBus block write of `data` (at most 32 bytes) to `command`.
    ///
    /// # Errors
    ///
    /// Returns an error if the transfer fails or `data` does not fit in one
    /// block.
    fn block_write(&self, command: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Whether the controller delivers SMBus host-notify alerts.
    fn host_notify_supported(&self) -> bool {
        true
    }
}
