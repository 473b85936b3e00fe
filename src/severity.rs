// Severity levels for log records

use serde::{Deserialize, Serialize};

/// Log severity levels (0-4, higher is more severe)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Verbose diagnostics, suppressed by default thresholds
    Debug = 0,
    /// Normal operational messages
    Info = 1,
    /// Something unexpected that the application survived
    Warn = 2,
    /// Error conditions (operation failed, request aborted)
    Error = 3,
    /// Critical conditions requiring immediate attention
    Critical = 4,
}

impl Severity {
    /// Get severity level as u8 (0-4)
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Get severity name as static string
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }

    /// Severity tag as the literal bytes written into the frame
    #[inline]
    pub const fn label(self) -> &'static [u8] {
        self.as_str().as_bytes()
    }

    /// Create from u8 value (returns None if invalid)
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Severity::Debug),
            1 => Some(Severity::Info),
            2 => Some(Severity::Warn),
            3 => Some(Severity::Error),
            4 => Some(Severity::Critical),
            _ => None,
        }
    }

    /// Parse a level name, case-insensitively (returns None if unknown)
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "DEBUG" => Some(Severity::Debug),
            "INFO" => Some(Severity::Info),
            "WARN" => Some(Severity::Warn),
            "ERROR" => Some(Severity::Error),
            "CRITICAL" => Some(Severity::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
        assert!(Severity::Error < Severity::Critical);
    }

    #[test]
    fn test_severity_values() {
        assert_eq!(Severity::Debug.as_u8(), 0);
        assert_eq!(Severity::Critical.as_u8(), 4);
    }

    #[test]
    fn test_severity_from_u8() {
        assert_eq!(Severity::from_u8(0), Some(Severity::Debug));
        assert_eq!(Severity::from_u8(4), Some(Severity::Critical));
        assert_eq!(Severity::from_u8(5), None);
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!(Severity::parse("INFO"), Some(Severity::Info));
        assert_eq!(Severity::parse("warn"), Some(Severity::Warn));
        assert_eq!(Severity::parse("Critical"), Some(Severity::Critical));
        assert_eq!(Severity::parse("TRACE"), None);
        assert_eq!(Severity::parse(""), None);
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(format!("{}", Severity::Debug), "DEBUG");
        assert_eq!(format!("{}", Severity::Info), "INFO");
    }
}
