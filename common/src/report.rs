use std::{fmt, io::Write};

use log::warn;

use crate::temperature::Temperature;

/// One status line as emitted on the serial link: `<TT, SS, H, SSSS>\r\n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusLine {
    pub temperature: Temperature,
    pub set_point: i32,
    pub heat_on: bool,
    pub seconds: u32,
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{:02}, {:02}, {}, {:04}>\r\n",
            self.temperature.whole_degrees(),
            self.set_point,
            u8::from(self.heat_on),
            self.seconds
        )
    }
}

/// Blocking byte-stream writer shared by status lines and diagnostics.
///
/// This is the only user-visible output of the board. A failed write is
/// logged and otherwise ignored; the caller never blocks on recovery.
pub struct Console<W> {
    writer: W,
    line: String,
}

impl<W: Write> Console<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            line: String::with_capacity(64),
        }
    }

    /// Format and write one message. Returns the number of bytes accepted.
    pub fn display(&mut self, args: fmt::Arguments<'_>) -> usize {
        self.line.clear();
        if fmt::write(&mut self.line, args).is_err() {
            warn!("console message formatting failed");
            return 0;
        }

        let result = self
            .writer
            .write_all(self.line.as_bytes())
            .and_then(|()| self.writer.flush());

        match result {
            Ok(()) => self.line.len(),
            Err(err) => {
                warn!("console write failed: {err}");
                0
            }
        }
    }

    /// Last line written before the board parks for good.
    pub fn halt_notice(&mut self, cause: &dyn fmt::Display) -> usize {
        self.display(format_args!("Start-up failed: {cause:#}\r\n"))
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// `display!(console, "fmt", args..)` writes a formatted message to a [`Console`].
#[macro_export]
macro_rules! display {
    ($console:expr, $($arg:tt)*) => {
        $console.display(format_args!($($arg)*))
    };
}
