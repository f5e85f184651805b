// Licensed under the Apache-2.0 license

//! SMBus bus primitives consumed by the RMI transport.

pub mod common;
pub mod smbus_controller;
pub mod traits;

pub use common::{SMB_MAX_COUNT, SMB_PROTOCOL_VERSION_ADDRESS};
pub use smbus_controller::{SmbusController, SmbusError};
pub use traits::SmbusBlockAccess;
