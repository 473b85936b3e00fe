// SPDX-License-Identifier: MIT
// Logging macros for convenient logging

/// Log a message with debug severity
///
/// # Examples
/// ```ignore
/// log_debug!(logger, "cache miss for {}", key);
/// ```
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log_args($crate::Severity::Debug, ::std::format_args!($($arg)+))
    };
}

/// Log a message with info severity
///
/// A plain literal with no placeholders takes the zero-allocation path.
///
/// # Examples
/// ```ignore
/// log_info!(logger, "listener started");
/// log_info!(logger, "accepted connection from {}", addr);
/// ```
#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log_args($crate::Severity::Info, ::std::format_args!($($arg)+))
    };
}

/// Log a message with warn severity
#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log_args($crate::Severity::Warn, ::std::format_args!($($arg)+))
    };
}

/// Log a message with error severity
///
/// # Examples
/// ```ignore
/// log_error!(logger, "failed to bind socket: {}", err);
/// ```
#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log_args($crate::Severity::Error, ::std::format_args!($($arg)+))
    };
}

/// Log a message with critical severity
#[macro_export]
macro_rules! log_critical {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log_args($crate::Severity::Critical, ::std::format_args!($($arg)+))
    };
}

/// Log a key/value record; a JSON object when structured mode is on.
///
/// # Examples
/// ```ignore
/// log_fields!(logger, Severity::Info, "user" => "bob", "port" => 5000);
/// ```
#[macro_export]
macro_rules! log_fields {
    ($logger:expr, $severity:expr, $($key:expr => $value:expr),+ $(,)?) => {{
        let fields: &[(&str, $crate::Value)] = &[$(($key, $crate::Value::from($value))),+];
        $logger.log_fields($severity, fields)
    }};
}
