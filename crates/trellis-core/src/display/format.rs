//! Small formatting helpers shared by the model and result displays.

use std::fmt;

use jiff::{Timestamp, tz::TimeZone};

/// A timestamp rendered in the system timezone as `YYYY-MM-DD HH:MM:SS TZ`.
pub struct LocalDateTime<'a>(pub &'a Timestamp);

impl fmt::Display for LocalDateTime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.0
                .to_zoned(TimeZone::system())
                .strftime("%Y-%m-%d %H:%M:%S %Z")
        )
    }
}

/// A completion percentage drawn as a ten-cell bar, e.g. `▰▰▰▰▱▱▱▱▱▱ 40%`.
pub struct ProgressBar(pub u8);

impl ProgressBar {
    const CELLS: usize = 10;
}

impl fmt::Display for ProgressBar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let percent = self.0.min(100);
        let filled = (usize::from(percent) * Self::CELLS + 50) / 100;
        write!(
            f,
            "{}{} {percent}%",
            "▰".repeat(filled),
            "▱".repeat(Self::CELLS - filled)
        )
    }
}

/// A one-line confirmation or failure message.
pub struct OperationStatus {
    pub message: String,
    pub success: bool,
}

impl OperationStatus {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: true,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: false,
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.success { "Success:" } else { "Error:" };
        writeln!(f, "{prefix} {}", self.message)
    }
}
