// Licensed under the Apache-2.0 license

//! Logging hooks shared by the bus and transport layers.
//!
//! Drivers take a `Logger` type parameter defaulting to [`NoOpLogger`], so a
//! build that does not care about diagnostics pays nothing for them.

use core::fmt;
use embedded_io::Write;

/// Sink for driver diagnostics.
pub trait Logger {
    fn debug(&mut self, args: fmt::Arguments<'_>);
    fn error(&mut self, args: fmt::Arguments<'_>);
}

/// Logger that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpLogger;

impl Logger for NoOpLogger {
    fn debug(&mut self, _args: fmt::Arguments<'_>) {}
    fn error(&mut self, _args: fmt::Arguments<'_>) {}
}

/// Logger that renders one line per message into a byte sink (a UART, a ring
/// buffer, ...).
///
/// Write failures are ignored: a broken log channel must never fail a bus
/// transaction.
pub struct WriterLogger<W: Write> {
    writer: W,
}

impl<W: Write> WriterLogger<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Logger for WriterLogger<W> {
    fn debug(&mut self, args: fmt::Arguments<'_>) {
        let _ = self.writer.write_fmt(format_args!("[debug] {args}\r\n"));
    }

    fn error(&mut self, args: fmt::Arguments<'_>) {
        let _ = self.writer.write_fmt(format_args!("[error] {args}\r\n"));
    }
}
