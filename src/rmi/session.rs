// Licensed under the Apache-2.0 license

//! SMBus RMI transport session.
//!
//! One [`SmbusTransport`] exists per attached device. It owns the host copy of
//! the device's address map and two locks:
//!
//! - the page-select lock, held for a whole `read`/`read_block`/`write`/
//!   `block_write` call (negotiation plus the data transfer), so exactly one
//!   transaction per device is on the bus at a time;
//! - the mapping-table lock, taken only inside negotiation.
//!
//! Negotiation never takes the page-select lock, so the two never nest the
//! other way round.
//!
//! # Examples
//!
//! ```rust,no_run
//! use rmi_smbus::rmi::{RmiTransport, SmbusTransport, TransportConfig};
//! use rmi_smbus::smbus::SmbusBlockAccess;
//! use rmi_smbus::common::NoOpLogger;
//!
//! fn query<B: SmbusBlockAccess + Sync>(bus: &B) -> Option<[u8; 4]> {
//!     let transport = SmbusTransport::attach(bus, TransportConfig::default(), NoOpLogger).ok()?;
//!     let mut pdt = [0u8; 4];
//!     transport.read_block(0x00e9, &mut pdt).ok()?;
//!     transport.detach();
//!     Some(pdt)
//! }
//! ```

use crate::common::{Logger, NoOpLogger};
use crate::rmi::config::TransportConfig;
use crate::rmi::error::Error;
use crate::rmi::mapping_table::MappingTable;
use crate::rmi::negotiator::Negotiator;
use crate::rmi::notify::{ClientSlot, HostNotify};
use crate::rmi::transport::RmiTransport;
use crate::smbus::{SmbusBlockAccess, SMB_MAX_COUNT, SMB_PROTOCOL_VERSION_ADDRESS};
use spin::Mutex;

/// State guarded by the page-select lock.
struct PageState<L> {
    logger: L,
    version: u8,
}

pub struct SmbusTransport<'a, B: SmbusBlockAccess, L: Logger = NoOpLogger> {
    bus: &'a B,
    config: TransportConfig,
    page: Mutex<PageState<L>>,
    table: Mutex<MappingTable>,
    client: ClientSlot<'a>,
}

impl<'a, B: SmbusBlockAccess, L: Logger> SmbusTransport<'a, B, L> {
    /// Bring up a device on `bus`.
    ///
    /// Reads the protocol version straight from its byte register, before any
    /// address mapping exists, and starts with an empty mapping table.
    ///
    /// # Errors
    ///
    /// * `Error::UnsupportedAdapter` if host notify is required but missing.
    /// * `Error::Bus` if the version register cannot be read.
    /// * `Error::UnsupportedProtocolVersion` if the version is out of range.
    pub fn attach(
        bus: &'a B,
        config: TransportConfig,
        mut logger: L,
    ) -> Result<Self, Error<B::Error>> {
        if config.require_host_notify && !bus.host_notify_supported() {
            logger.error(format_args!("adapter does not support SMBus host notify"));
            return Err(Error::UnsupportedAdapter);
        }

        let version = probe_version(bus, &config, &mut logger)?;
        logger.debug(format_args!("SMBus version is {version}"));

        Ok(Self {
            bus,
            config,
            page: Mutex::new(PageState { logger, version }),
            table: Mutex::new(MappingTable::new()),
            client: ClientSlot::new(),
        })
    }

    /// Tear the session down and hand back its logger.
    pub fn detach(self) -> L {
        self.client.detach();
        let mut page = self.page.into_inner();
        page.logger.debug(format_args!("detached"));
        page.logger
    }

    /// Protocol version negotiated at attach or at the last reset.
    pub fn protocol_version(&self) -> u8 {
        self.page.lock().version
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Copy of the host-side mapping table.
    pub fn mapping_snapshot(&self) -> MappingTable {
        self.table.lock().clone()
    }

    /// Discard every address binding and re-read the protocol version.
    ///
    /// The device flushes its own map when reset, so the host copy must go
    /// too. The physical reset itself is the caller's business.
    ///
    /// # Errors
    ///
    /// Same as the version checks in [`attach`](Self::attach).
    pub fn reset(&self) -> Result<u8, Error<B::Error>> {
        self.renegotiate("reset")
    }

    /// Restore the session after a power transition.
    ///
    /// # Errors
    ///
    /// Same as the version checks in [`attach`](Self::attach).
    pub fn resume(&self) -> Result<u8, Error<B::Error>> {
        self.renegotiate("resume")
    }

    fn renegotiate(&self, reason: &str) -> Result<u8, Error<B::Error>> {
        let mut page = self.page.lock();
        self.table.lock().reset();
        page.logger
            .debug(format_args!("{reason}: mapping table cleared"));

        let version = probe_version(self.bus, &self.config, &mut page.logger)?;
        page.version = version;
        Ok(version)
    }

    /// Route host-notify alerts to `client`.
    pub fn attach_client(&self, client: &'a (dyn HostNotify + Sync)) {
        self.client.attach(client);
    }

    pub fn detach_client(&self) -> bool {
        self.client.detach()
    }

    /// Entry point for the bus driver's alert signal. Returns whether a
    /// client received it; a dropped alert is left for the caller to report,
    /// since the session logger sits behind the page-select lock.
    pub fn handle_alert(&self) -> bool {
        self.client.notify()
    }

    fn negotiator(&self) -> Negotiator<'_, B> {
        Negotiator::new(self.bus, &self.table)
    }
}

fn probe_version<B: SmbusBlockAccess, L: Logger>(
    bus: &B,
    config: &TransportConfig,
    logger: &mut L,
) -> Result<u8, Error<B::Error>> {
    let raw = bus
        .read_byte_data(SMB_PROTOCOL_VERSION_ADDRESS)
        .map_err(|e| {
            logger.error(format_args!("failed to get SMBus version: {e:?}"));
            Error::Bus(e)
        })?;

    // The register holds the version minus one.
    let Some(version) = raw.checked_add(1) else {
        logger.error(format_args!("unrecognized SMB version register 0x{raw:02x}"));
        return Err(Error::UnsupportedProtocolVersion(None));
    };
    if !config.supported_versions().contains(&version) {
        logger.error(format_args!("unrecognized SMB version {version}"));
        return Err(Error::UnsupportedProtocolVersion(Some(version)));
    }
    Ok(version)
}

fn check_block_len<E: core::fmt::Debug>(len: usize) -> Result<(), Error<E>> {
    match len {
        0 => Err(Error::InvalidLength(len)),
        n if n > SMB_MAX_COUNT => Err(Error::LengthExceeded(len)),
        _ => Ok(()),
    }
}

impl<B: SmbusBlockAccess, L: Logger> RmiTransport for SmbusTransport<'_, B, L> {
    type Error = Error<B::Error>;

    fn read(&self, addr: u16) -> Result<u8, Self::Error> {
        let mut value = [0u8; 1];
        self.read_block(addr, &mut value)?;
        let [byte] = value;
        Ok(byte)
    }

    fn read_block(&self, addr: u16, buf: &mut [u8]) -> Result<usize, Self::Error> {
        check_block_len::<B::Error>(buf.len())?;

        let mut page = self.page.lock();
        buf.fill(0);
        let command = self
            .negotiator()
            .command_code(&mut page.logger, addr, buf.len(), true)?;

        match self.bus.block_read(command, buf) {
            Ok(n) if n >= buf.len() => Ok(n),
            Ok(n) => {
                page.logger.error(format_args!(
                    "short read of 0x{addr:04x}: expected {} bytes, got {n}",
                    buf.len()
                ));
                buf.fill(0);
                Err(Error::ShortRead {
                    expected: buf.len(),
                    actual: n,
                })
            }
            Err(e) => {
                page.logger
                    .error(format_args!("block read of 0x{addr:04x} failed: {e:?}"));
                buf.fill(0);
                Err(Error::Bus(e))
            }
        }
    }

    fn write(&self, addr: u16, value: u8) -> Result<(), Self::Error> {
        self.block_write(addr, &[value]).map(|_| ())
    }

    fn block_write(&self, addr: u16, data: &[u8]) -> Result<usize, Self::Error> {
        check_block_len::<B::Error>(data.len())?;

        let mut page = self.page.lock();
        let command = self
            .negotiator()
            .command_code(&mut page.logger, addr, data.len(), false)?;

        self.bus.block_write(command, data).map_err(|e| {
            page.logger
                .error(format_args!("block write of 0x{addr:04x} failed: {e:?}"));
            Error::Bus(e)
        })?;
        Ok(data.len())
    }
}
