// Licensed under the Apache-2.0 license

use core::fmt::{self, Debug, Display};
use embedded_hal::i2c::ErrorKind;

/// Errors returned by the SMBus RMI transport.
///
/// It wraps the bus adapter's error type `E` and adds the transport's own
/// logical errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E: Debug> {
    /// Requested byte count is zero or above the SMBus block limit.
    InvalidLength(usize),
    /// Block transfer wider than one SMBus transaction.
    LengthExceeded(usize),
    /// The map-write that binds an RMI address to a command code failed.
    CommandCodeUnavailable(E),
    /// A block read or block write on the bus failed.
    Bus(E),
    /// The device returned fewer bytes than the mapping promised.
    ShortRead { expected: usize, actual: usize },
    /// Protocol version outside the configured range. `None` when the raw
    /// register value cannot be decoded at all.
    UnsupportedProtocolVersion(Option<u8>),
    /// The adapter lacks a capability the configuration requires.
    UnsupportedAdapter,
}

const EINVAL: i32 = 22;
const EMSGSIZE: i32 = 90;
const EIO: i32 = 5;
const ENXIO: i32 = 6;
const ENODEV: i32 = 19;

impl<E: Debug> Error<E> {
    /// Negative errno-style status for callers that still speak signed byte
    /// counts.
    #[must_use]
    pub const fn legacy_status(&self) -> i32 {
        match self {
            Error::InvalidLength(_) => -EINVAL,
            Error::LengthExceeded(_) => -EMSGSIZE,
            Error::CommandCodeUnavailable(_) => -ENXIO,
            Error::Bus(_) | Error::ShortRead { .. } => -EIO,
            Error::UnsupportedProtocolVersion(_) | Error::UnsupportedAdapter => -ENODEV,
        }
    }
}

impl<E: embedded_hal::i2c::Error> embedded_hal::i2c::Error for Error<E> {
    fn kind(&self) -> ErrorKind {
        match self {
            Error::CommandCodeUnavailable(e) | Error::Bus(e) => e.kind(),
            _ => ErrorKind::Other,
        }
    }
}

impl<E: Debug> Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidLength(len) => write!(f, "invalid transfer length {len}"),
            Error::LengthExceeded(len) => {
                write!(f, "transfer of {len} bytes exceeds one SMBus block")
            }
            Error::CommandCodeUnavailable(e) => write!(f, "command code negotiation failed: {e:?}"),
            Error::Bus(e) => write!(f, "SMBus transfer failed: {e:?}"),
            Error::ShortRead { expected, actual } => {
                write!(f, "short block read: expected {expected}, got {actual}")
            }
            Error::UnsupportedProtocolVersion(Some(v)) => {
                write!(f, "unsupported SMBus protocol version {v}")
            }
            Error::UnsupportedProtocolVersion(None) => {
                write!(f, "undecodable SMBus protocol version")
            }
            Error::UnsupportedAdapter => write!(f, "adapter lacks SMBus host notify"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: Debug> std::error::Error for Error<E> {}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{Error as _, NoAcknowledgeSource};

    type TestError = Error<ErrorKind>;

    #[test]
    fn test_legacy_status_codes() {
        assert_eq!(TestError::InvalidLength(0).legacy_status(), -22);
        assert_eq!(TestError::LengthExceeded(33).legacy_status(), -90);
        assert_eq!(TestError::Bus(ErrorKind::Other).legacy_status(), -5);
        assert_eq!(
            TestError::CommandCodeUnavailable(ErrorKind::Other).legacy_status(),
            -6
        );
        assert_eq!(
            TestError::UnsupportedProtocolVersion(Some(1)).legacy_status(),
            -19
        );
    }

    #[test]
    fn test_kind_distinguishes_bus_from_logic_errors() {
        let nak = ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data);
        assert_eq!(TestError::Bus(nak).kind(), nak);
        assert_eq!(TestError::CommandCodeUnavailable(nak).kind(), nak);
        assert_eq!(TestError::InvalidLength(0).kind(), ErrorKind::Other);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            TestError::ShortRead {
                expected: 4,
                actual: 2
            }
            .to_string(),
            "short block read: expected 4, got 2"
        );
        assert_eq!(
            TestError::UnsupportedProtocolVersion(Some(1)).to_string(),
            "unsupported SMBus protocol version 1"
        );
    }
}
