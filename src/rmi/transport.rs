// Licensed under the Apache-2.0 license

//! Register access offered to the upper RMI layer.
//!
//! The RMI core addresses a 16-bit register space and does not care which bus
//! carries it. Each bus variant implements [`RmiTransport`]; only the SMBus
//! variant lives in this crate.

/// Byte and block access to RMI registers.
///
/// Methods take `&self`: a transport is shared between the RMI core and any
/// function handlers, and serialises bus access internally.
pub trait RmiTransport {
    type Error;

    /// Read the single register at `addr`.
    ///
    /// # Errors
    ///
    /// Returns an error if negotiation or the bus transfer fails.
    fn read(&self, addr: u16) -> Result<u8, Self::Error>;

    /// Fill `buf` with consecutive registers starting at `addr`. Returns the
    /// number of bytes read, always `buf.len()` on success.
    ///
    /// # Errors
    ///
    /// Returns an error if `buf` is empty or wider than one bus transaction,
    /// or if negotiation or the transfer fails. `buf` is zeroed on failure.
    fn read_block(&self, addr: u16, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write the single register at `addr`.
    ///
    /// # Errors
    ///
    /// Returns an error if negotiation or the bus transfer fails.
    fn write(&self, addr: u16, value: u8) -> Result<(), Self::Error>;

    /// Write `data` to consecutive registers starting at `addr`. Returns the
    /// number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` is empty or wider than one bus transaction,
    /// or if negotiation or the transfer fails.
    fn block_write(&self, addr: u16, data: &[u8]) -> Result<usize, Self::Error>;
}
