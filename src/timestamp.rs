// SPDX-License-Identifier: MIT
//! Timestamp layouts and the shared pre-formatted time cache.
//!
//! Formatting a timestamp per record is far too slow for the hot path, so the
//! logger formats once every [`REFRESH_INTERVAL`] and publishes the rendered
//! bytes through an atomic slot. Producers and the writer read whatever stamp
//! is current at the moment a record is framed.

use arc_swap::ArcSwap;
use chrono::format::{Item, StrftimeItems};
use chrono::Local;
use std::sync::Arc;
use std::time::Duration;

/// `Mon Jan  2 15:04:05 2006`
pub const ANSIC: &str = "%a %b %e %H:%M:%S %Y";
/// `Mon Jan  2 15:04:05 +00:00 2006`
pub const UNIX_DATE: &str = "%a %b %e %H:%M:%S %Z %Y";
/// `Mon Jan 02 15:04:05 -0700 2006`
pub const RUBY_DATE: &str = "%a %b %d %H:%M:%S %z %Y";
/// `02 Jan 06 15:04 +00:00`
pub const RFC822: &str = "%d %b %y %H:%M %Z";
/// `02 Jan 06 15:04 -0700`
pub const RFC822Z: &str = "%d %b %y %H:%M %z";
/// `Monday, 02-Jan-06 15:04:05 +00:00`
pub const RFC850: &str = "%A, %d-%b-%y %H:%M:%S %Z";
/// `Mon, 02 Jan 2006 15:04:05 +00:00`
pub const RFC1123: &str = "%a, %d %b %Y %H:%M:%S %Z";
/// `Mon, 02 Jan 2006 15:04:05 -0700`
pub const RFC1123Z: &str = "%a, %d %b %Y %H:%M:%S %z";
/// `2006-01-02T15:04:05+07:00`
pub const RFC3339: &str = "%Y-%m-%dT%H:%M:%S%:z";
/// `2006-01-02T15:04:05.999999999+07:00`
pub const RFC3339_NANO: &str = "%Y-%m-%dT%H:%M:%S%.9f%:z";
/// `3:04PM`
pub const KITCHEN: &str = "%-I:%M%p";
/// `Jan 2, 2006 15:04:05.000000 +00:00` - the default layout
pub const SPECIAL: &str = "%b %-d, %Y %H:%M:%S%.6f %Z";
/// `Jan  2 15:04:05`
pub const STAMP: &str = "%b %e %H:%M:%S";
/// `Jan  2 15:04:05.000`
pub const STAMP_MILLI: &str = "%b %e %H:%M:%S%.3f";
/// `Jan  2 15:04:05.000000`
pub const STAMP_MICRO: &str = "%b %e %H:%M:%S%.6f";
/// `Jan  2 15:04:05.000000000`
pub const STAMP_NANO: &str = "%b %e %H:%M:%S%.9f";

/// How often the cached stamp is re-rendered.
pub(crate) const REFRESH_INTERVAL: Duration = Duration::from_millis(100);

/// Layout of the day string compared on daily rotation.
pub(crate) const LAST_DAY_FORMAT: &str = "%Y-%m-%d";

/// Check a strftime pattern without formatting anything.
///
/// chrono panics when asked to render a pattern containing invalid
/// specifiers, so every caller-supplied pattern goes through here first.
pub(crate) fn is_valid_format(format: &str) -> bool {
    StrftimeItems::new(format).all(|item| !matches!(item, Item::Error))
}

/// Today's calendar day in `%Y-%m-%d` form.
pub(crate) fn today() -> String {
    Local::now().format(LAST_DAY_FORMAT).to_string()
}

/// Periodically refreshed pre-formatted timestamp, shared read-mostly.
///
/// Both the pattern and the rendered stamp are whole-value swapped, so a
/// reader always observes a complete string.
pub(crate) struct TimeCache {
    format: ArcSwap<String>,
    stamp: ArcSwap<String>,
}

impl TimeCache {
    /// Create a cache rendering `format`, which must already be validated.
    pub fn new(format: &str) -> TimeCache {
        let cache = TimeCache {
            format: ArcSwap::from_pointee(format.to_string()),
            stamp: ArcSwap::from_pointee(String::new()),
        };
        cache.refresh();
        cache
    }

    /// The stamp rendered at the most recent refresh.
    #[inline]
    pub fn stamp(&self) -> Arc<String> {
        self.stamp.load_full()
    }

    /// Install a new pattern and re-render immediately.
    ///
    /// Returns false (leaving the previous pattern in place) when the
    /// pattern does not parse.
    pub fn set_format(&self, format: &str) -> bool {
        if !is_valid_format(format) {
            return false;
        }
        self.format.store(Arc::new(format.to_string()));
        self.refresh();
        true
    }

    /// Re-render the stamp from the current clock reading.
    pub fn refresh(&self) {
        let format = self.format.load_full();
        let rendered = Local::now().format(format.as_str()).to_string();
        self.stamp.store(Arc::new(rendered));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_patterns_are_valid() {
        for pattern in [
            ANSIC, UNIX_DATE, RUBY_DATE, RFC822, RFC822Z, RFC850, RFC1123, RFC1123Z, RFC3339,
            RFC3339_NANO, KITCHEN, SPECIAL, STAMP, STAMP_MILLI, STAMP_MICRO, STAMP_NANO,
        ] {
            assert!(is_valid_format(pattern), "pattern {pattern:?} rejected");
        }
    }

    #[test]
    fn test_invalid_format_rejected() {
        assert!(!is_valid_format("%Y-%m-%d %\u{1}"));
        assert!(!is_valid_format("%"));
    }

    #[test]
    fn test_today_shape() {
        let day = today();
        assert_eq!(day.len(), 10);
        assert_eq!(day.as_bytes()[4], b'-');
        assert_eq!(day.as_bytes()[7], b'-');
    }

    #[test]
    fn test_cache_renders_on_creation() {
        let cache = TimeCache::new(RFC3339);
        let stamp = cache.stamp();
        assert!(stamp.contains('T'), "unexpected stamp: {stamp}");
    }

    #[test]
    fn test_set_format_rerenders() {
        let cache = TimeCache::new(RFC3339);
        assert!(cache.set_format(LAST_DAY_FORMAT));
        assert_eq!(cache.stamp().len(), 10);
    }

    #[test]
    fn test_set_format_keeps_old_on_error() {
        let cache = TimeCache::new(LAST_DAY_FORMAT);
        let before = cache.stamp();
        assert!(!cache.set_format("%"));
        assert_eq!(*cache.stamp(), *before);
    }
}
