//! Conversion from a Unix timestamp to packed DOS date/time words.
//! Timestamps are always interpreted as UTC, so the wire bytes this
//! produces don't depend on where the writer happens to run.
use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};

/// 1980-01-01 00:00:00, the earliest date DOS date/time can represent.
const DOS_EPOCH_DATE: u16 = (1 << 5) | 1;
const DOS_EPOCH_TIME: u16 = 0;

/// 2107-12-31 23:59:58, the latest date/time the 7-bit DOS year field
/// can represent without wrapping. Timestamps past this are clamped
/// here rather than silently wrapping the year back to 1980.
const DOS_MAX_YEAR: i32 = 2107;
const DOS_MAX_DATE: u16 = (127 << 9) | (12 << 5) | 31;
const DOS_MAX_TIME: u16 = (23 << 11) | (59 << 5) | 29;

/// Convert a Unix timestamp (seconds since the epoch) into `(dos_date,
/// dos_time)`, both ready to be written little-endian onto the wire.
pub(crate) fn to_dos_date_time(unix_timestamp: i64) -> (u16, u16) {
    match Utc.timestamp_opt(unix_timestamp, 0).single() {
        Some(dt) if dt.year() < 1980 => (DOS_EPOCH_DATE, DOS_EPOCH_TIME),
        Some(dt) if dt.year() > DOS_MAX_YEAR => (DOS_MAX_DATE, DOS_MAX_TIME),
        Some(dt) => encode(dt),
        // Timestamp out of chrono's representable range entirely.
        None if unix_timestamp < 0 => (DOS_EPOCH_DATE, DOS_EPOCH_TIME),
        None => (DOS_MAX_DATE, DOS_MAX_TIME),
    }
}

fn encode(dt: DateTime<Utc>) -> (u16, u16) {
    let year = (dt.year() - 1980) as u16 & 0x7F;
    let month = dt.month() as u16 & 0x0F;
    let day = dt.day() as u16 & 0x1F;
    let dos_date = (year << 9) | (month << 5) | day;

    let hour = dt.hour() as u16 & 0x1F;
    let minute = dt.minute() as u16 & 0x3F;
    let second = (dt.second() / 2) as u16 & 0x1F;
    let dos_time = (hour << 11) | (minute << 5) | second;

    (dos_date, dos_time)
}

/// The current wall-clock time, in Unix seconds. Used as the archive's
/// default timestamp when the caller supplies none.
pub(crate) fn unix_now() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
