// Timestamped commit messages.

use chrono::NaiveDateTime;

pub const COMMIT_MESSAGE_PREFIX: &str = "Auto-commit: ";

/// `YYYY-MM-DD HH:MM:SS`, local time.
pub const COMMIT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Time-of-day shown when a change batch is detected.
pub const DETECTION_TIME_FORMAT: &str = "%H:%M:%S";

/// `Auto-commit: YYYY-MM-DD HH:MM:SS` for the given local time.
pub fn commit_message(at: NaiveDateTime) -> String {
    format!("{COMMIT_MESSAGE_PREFIX}{}", at.format(COMMIT_TIMESTAMP_FORMAT))
}

pub fn detection_time(at: NaiveDateTime) -> String {
    at.format(DETECTION_TIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap().and_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn commit_message_is_prefix_and_timestamp() {
        assert_eq!(commit_message(at(9, 5, 3)), "Auto-commit: 2024-03-07 09:05:03");
    }

    #[test]
    fn commit_message_drops_subsecond_precision() {
        let precise = at(23, 59, 59) + chrono::Duration::milliseconds(999);
        assert_eq!(commit_message(precise), "Auto-commit: 2024-03-07 23:59:59");
    }

    #[test]
    fn detection_time_is_time_of_day() {
        assert_eq!(detection_time(at(14, 0, 7)), "14:00:07");
    }
}
