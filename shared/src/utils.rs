// Time bucketing and display helpers shared by the engine and the GUI.
use chrono::{DateTime, FixedOffset, Offset, Utc};

pub const MS_PER_HOUR: i64 = 3_600_000;

/// Wall clock in epoch milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Bucket width in milliseconds. A zero timeframe is treated as one second.
pub fn bucket_width_ms(timeframe_seconds: u32) -> i64 {
    i64::from(timeframe_seconds.max(1)) * 1000
}

/// Timezone shift in milliseconds for an hour offset such as `-3.0` or `5.5`.
pub fn tz_offset_ms(tz_offset_hours: f64) -> i64 {
    if tz_offset_hours.is_finite() {
        (tz_offset_hours * MS_PER_HOUR as f64).round() as i64
    } else {
        0
    }
}

/// Start of the bucket containing `time_ms`, with edges aligned to local time.
pub fn bucket_start(time_ms: i64, width_ms: i64, tz_shift_ms: i64) -> i64 {
    let local = time_ms + tz_shift_ms;
    local.div_euclid(width_ms) * width_ms - tz_shift_ms
}

/// "MM:SS" countdown, or "HH:MM:SS" once it reaches an hour. Negative input shows zero.
pub fn format_countdown(remaining_ms: i64) -> String {
    // round up so the box never shows 00:00 while time is left
    let total_secs = (remaining_ms.max(0) + 999) / 1000;
    let (h, m, s) = (total_secs / 3600, (total_secs % 3600) / 60, total_secs % 60);
    if h > 0 {
        format!("{:02}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

/// Decimal places that keep roughly five significant digits on screen.
pub fn price_decimals(price: f64) -> usize {
    let magnitude = price.abs();
    if magnitude >= 10_000.0 {
        2
    } else if magnitude >= 100.0 {
        3
    } else if magnitude >= 1.0 {
        4
    } else {
        5
    }
}

pub fn format_price(price: f64) -> String {
    format!("{:.*}", price_decimals(price), price)
}

/// Axis label for a bucket start in the given local offset.
pub fn format_time_label(time_ms: i64, tz_offset_hours: f64, with_seconds: bool) -> String {
    let offset_secs = (tz_offset_ms(tz_offset_hours) / 1000) as i32;
    let offset = FixedOffset::east_opt(offset_secs).unwrap_or_else(|| Utc.fix());
    match DateTime::<Utc>::from_timestamp_millis(time_ms) {
        Some(dt) => {
            let local = dt.with_timezone(&offset);
            if with_seconds {
                local.format("%H:%M:%S").to_string()
            } else {
                local.format("%H:%M").to_string()
            }
        }
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_start_aligns_to_width() {
        assert_eq!(bucket_start(59_999, 60_000, 0), 0);
        assert_eq!(bucket_start(60_000, 60_000, 0), 60_000);
        assert_eq!(bucket_start(-1, 60_000, 0), -60_000);
    }

    #[test]
    fn bucket_start_respects_timezone_shift() {
        let hour = MS_PER_HOUR;
        let half_hour_shift = tz_offset_ms(5.5);
        // 1h buckets in UTC+5:30 start at :30 UTC
        let start = bucket_start(2 * hour, hour, half_hour_shift);
        assert_eq!(start, hour + hour / 2);
    }

    #[test]
    fn zero_timeframe_is_one_second() {
        assert_eq!(bucket_width_ms(0), 1000);
        assert_eq!(bucket_width_ms(60), 60_000);
    }

    #[test]
    fn countdown_formats() {
        assert_eq!(format_countdown(0), "00:00");
        assert_eq!(format_countdown(-5_000), "00:00");
        assert_eq!(format_countdown(59_001), "01:00");
        assert_eq!(format_countdown(61_000), "01:01");
        assert_eq!(format_countdown(3_600_000), "01:00:00");
    }

    #[test]
    fn price_formatting_tracks_magnitude() {
        assert_eq!(format_price(1.08512), "1.0851");
        assert_eq!(format_price(65_000.0), "65000.00");
        assert_eq!(format_price(0.123456), "0.12346");
    }

    #[test]
    fn time_label_applies_offset() {
        assert_eq!(format_time_label(0, 0.0, false), "00:00");
        assert_eq!(format_time_label(0, -3.0, false), "21:00");
        assert_eq!(format_time_label(61_000, 0.0, true), "00:01:01");
    }
}
