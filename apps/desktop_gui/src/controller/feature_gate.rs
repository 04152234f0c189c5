//! Reveal rule for the platform selector.

use chrono::{DateTime, Utc};
use url::Url;

pub const PLATFORM_REVEAL_QUERY_KEY: &str = "welcome_roo";
pub const PLATFORM_REVEAL_QUERY_VALUE: &str = "to_stdout";
/// 2025-11-19T11:30:00Z (12:30 Berlin time).
pub const PLATFORM_REVEAL_UNIX_SECS: i64 = 1_763_551_800;

/// Visible when the launch location carries the reveal flag or the reveal
/// instant has passed.
pub fn platform_selector_visible(location: &Url, now: DateTime<Utc>) -> bool {
    reveal_flag_present(location) || now.timestamp() >= PLATFORM_REVEAL_UNIX_SECS
}

fn reveal_flag_present(location: &Url) -> bool {
    location
        .query_pairs()
        .find(|(key, _)| key == PLATFORM_REVEAL_QUERY_KEY)
        .is_some_and(|(_, value)| value == PLATFORM_REVEAL_QUERY_VALUE)
}
