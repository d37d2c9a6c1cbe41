//! Clock services: local timezone, file modification times, "time ago" text

use crate::error::Result;
use chrono::{DateTime, FixedOffset, Local, Utc};
use chrono_humanize::HumanTime;
use once_cell::sync::Lazy;
use std::fs;
use std::path::Path;

/// Local timezone offset, resolved once per process
static LOCAL_OFFSET: Lazy<FixedOffset> = Lazy::new(|| *Local::now().offset());

/// The process-wide local timezone offset
pub fn local_offset() -> FixedOffset {
    *LOCAL_OFFSET
}

/// Current time in the local timezone
pub fn now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&local_offset())
}

/// Last modification time of `path` in the local timezone
pub fn modified_in_local_tz(path: &Path) -> Result<DateTime<FixedOffset>> {
    let modified = fs::metadata(path)?.modified()?;
    Ok(DateTime::<Utc>::from(modified).with_timezone(&local_offset()))
}

/// Human readable distance from `then` to `now`, e.g. "8 minutes ago"
pub fn time_ago(then: DateTime<FixedOffset>, now: DateTime<FixedOffset>) -> String {
    HumanTime::from(then.signed_duration_since(now)).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_time_ago_minutes() {
        let current = now();
        let old = current - Duration::minutes(8);
        assert_eq!(time_ago(old, current), "8 minutes ago");
    }

    #[test]
    fn test_time_ago_hours_and_days() {
        let current = now();
        assert_eq!(time_ago(current - Duration::minutes(61), current), "an hour ago");
        assert_eq!(time_ago(current - Duration::hours(5), current), "5 hours ago");
        assert_eq!(time_ago(current - Duration::days(3), current), "3 days ago");
    }

    #[test]
    fn test_time_ago_now_and_future() {
        let current = now();
        assert_eq!(time_ago(current, current), "now");
        assert_eq!(
            time_ago(current + Duration::minutes(8), current),
            "in 8 minutes"
        );
    }

    #[test]
    fn test_local_offset_is_stable() {
        assert_eq!(local_offset(), local_offset());
    }

    #[test]
    fn test_modified_in_local_tz() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("file");
        fs::write(&path, b"x").unwrap();

        let modified = modified_in_local_tz(&path).unwrap();
        assert_eq!(*modified.offset(), local_offset());
        assert!(now().signed_duration_since(modified).num_minutes() < 5);
    }

    #[test]
    fn test_modified_missing_file_is_error() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(modified_in_local_tz(&temp.path().join("missing")).is_err());
    }
}
