// Licensed under the Apache-2.0 license

//! Attach-time configuration for the SMBus RMI transport.

use core::ops::RangeInclusive;

/// Lowest SMBus RMI protocol version the transport speaks.
pub const SMB_VERSION_MIN: u8 = 2;
/// Highest SMBus RMI protocol version the transport speaks.
pub const SMB_VERSION_MAX: u8 = 3;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportConfig {
    pub min_protocol_version: u8,
    pub max_protocol_version: u8,
    /// Refuse to attach when the adapter cannot deliver host-notify alerts.
    pub require_host_notify: bool,
}

impl TransportConfig {
    #[must_use]
    pub fn supported_versions(&self) -> RangeInclusive<u8> {
        self.min_protocol_version..=self.max_protocol_version
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfigBuilder::new().build()
    }
}

pub struct TransportConfigBuilder {
    min_protocol_version: u8,
    max_protocol_version: u8,
    require_host_notify: bool,
}

impl Default for TransportConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_protocol_version: SMB_VERSION_MIN,
            max_protocol_version: SMB_VERSION_MAX,
            require_host_notify: true,
        }
    }
    #[must_use]
    pub fn min_protocol_version(mut self, version: u8) -> Self {
        self.min_protocol_version = version;
        self
    }
    #[must_use]
    pub fn max_protocol_version(mut self, version: u8) -> Self {
        self.max_protocol_version = version;
        self
    }
    #[must_use]
    pub fn require_host_notify(mut self, required: bool) -> Self {
        self.require_host_notify = required;
        self
    }
    /// Inverted version bounds are swapped so the range is never empty.
    #[must_use]
    pub fn build(self) -> TransportConfig {
        let (min, max) = if self.min_protocol_version > self.max_protocol_version {
            (self.max_protocol_version, self.min_protocol_version)
        } else {
            (self.min_protocol_version, self.max_protocol_version)
        };
        TransportConfig {
            min_protocol_version: min,
            max_protocol_version: max,
            require_host_notify: self.require_host_notify,
        }
    }
}
