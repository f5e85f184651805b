// Licensed under the Apache-2.0 license

//! RMI register access over SMBus.
//!
//! RMI addresses a 16-bit register space; SMBus block transfers address an
//! 8-bit command code. The device bridges the two with a small remappable
//! table of command codes, and this module keeps that table in step with the
//! device while serialising transactions.

pub mod config;
pub mod error;
pub mod mapping_table;
pub mod negotiator;
pub mod notify;
pub mod session;
pub mod transport;

pub use config::{TransportConfig, TransportConfigBuilder};
pub use error::Error;
pub use mapping_table::{MappingEntry, MappingTable, RMI_SMB2_MAP_SIZE};
pub use notify::HostNotify;
pub use session::SmbusTransport;
pub use transport::RmiTransport;
