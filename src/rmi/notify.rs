// Licensed under the Apache-2.0 license

//! Host-notify pass-through to the attached RMI client.
//!
//! The bus raises an SMBus alert when the device has data; the transport only
//! forwards it. Delivery never takes the page-select lock, so an alert can
//! arrive while a transaction is in flight.

use spin::RwLock;

/// Receiver of SMBus host-notify alerts, normally the upper RMI layer.
pub trait HostNotify {
    fn host_notify(&self);
}

impl<F: Fn()> HostNotify for F {
    fn host_notify(&self) {
        self();
    }
}

/// The single client currently attached to a transport.
pub struct ClientSlot<'a> {
    client: RwLock<Option<&'a (dyn HostNotify + Sync)>>,
}

impl Default for ClientSlot<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> ClientSlot<'a> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            client: RwLock::new(None),
        }
    }

    /// Attach `client`, replacing any previous one.
    pub fn attach(&self, client: &'a (dyn HostNotify + Sync)) {
        *self.client.write() = Some(client);
    }

    /// Detach the current client. Returns whether one was attached.
    pub fn detach(&self) -> bool {
        self.client.write().take().is_some()
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.client.read().is_some()
    }

    /// Forward an alert. Without a client the alert is dropped and `false`
    /// returned.
    ///
    /// The lock is released before the client runs, so the client may
    /// detach or replace itself from inside the callback.
    pub fn notify(&self) -> bool {
        let client = *self.client.read();
        match client {
            Some(client) => {
                client.host_notify();
                true
            }
            None => false,
        }
    }
}
