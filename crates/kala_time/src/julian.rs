//! Julian Date helpers for millisecond counts.
//!
//! Every [`Instant`](crate::Instant) counts milliseconds from
//! 1970-01-01T00:00:00 as read in its own time system, i.e. from
//! JD 2440587.5 in that system. These helpers convert between that count,
//! Julian Dates and Julian centuries since J2000.0.

/// Julian Date of J2000.0 (2000-01-01T12:00:00).
pub const J2000_JD: f64 = 2_451_545.0;

/// Julian Date of the count origin, 1970-01-01T00:00:00.
pub const EPOCH_JD: f64 = 2_440_587.5;

/// Offset between Julian Date and Modified Julian Date.
pub const MJD_OFFSET: f64 = 2_400_000.5;

/// Modified Julian Date of the count origin.
pub const EPOCH_MJD: f64 = 40_587.0;

/// Seconds in one day.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Milliseconds in one day.
pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Days in one Julian century.
pub const DAYS_PER_CENTURY: f64 = 36_525.0;

/// Count of J2000.0 (JD 2451545.0) in milliseconds since the origin.
pub const J2000_MILLIS: i64 = 946_728_000_000;

const MILLIS_PER_CENTURY: f64 = DAYS_PER_CENTURY * MILLIS_PER_DAY as f64;

/// Julian Date of a `(millis, nanos)` count.
pub fn millis_to_jd(millis: i64, nanos: u32) -> f64 {
    let days = millis.div_euclid(MILLIS_PER_DAY);
    let rem = millis.rem_euclid(MILLIS_PER_DAY) as f64 + nanos as f64 * 1e-6;
    EPOCH_JD + days as f64 + rem / MILLIS_PER_DAY as f64
}

/// Modified Julian Date of a `(millis, nanos)` count.
pub fn millis_to_mjd(millis: i64, nanos: u32) -> f64 {
    let days = millis.div_euclid(MILLIS_PER_DAY);
    let rem = millis.rem_euclid(MILLIS_PER_DAY) as f64 + nanos as f64 * 1e-6;
    EPOCH_MJD + days as f64 + rem / MILLIS_PER_DAY as f64
}

/// `(millis, nanos)` count of a Julian Date, rounded to the nearest nanosecond.
pub fn jd_to_millis(jd: f64) -> (i64, u32) {
    let days = jd - EPOCH_JD;
    let whole_days = days.floor();
    let frac_ms = (days - whole_days) * MILLIS_PER_DAY as f64;
    split_millis(whole_days as i64 * MILLIS_PER_DAY, frac_ms)
}

/// `(millis, nanos)` count of a Modified Julian Date.
pub fn mjd_to_millis(mjd: f64) -> (i64, u32) {
    let days = mjd - EPOCH_MJD;
    let whole_days = days.floor();
    let frac_ms = (days - whole_days) * MILLIS_PER_DAY as f64;
    split_millis(whole_days as i64 * MILLIS_PER_DAY, frac_ms)
}

fn split_millis(base: i64, frac_ms: f64) -> (i64, u32) {
    let whole = frac_ms.floor();
    let mut millis = base + whole as i64;
    let mut nanos = ((frac_ms - whole) * 1e6).round() as i64;
    if nanos >= 1_000_000 {
        millis += 1;
        nanos -= 1_000_000;
    }
    (millis, nanos as u32)
}

/// Julian centuries since J2000.0 of a `(millis, nanos)` count.
pub fn julian_centuries(millis: i64, nanos: u32) -> f64 {
    ((millis - J2000_MILLIS) as f64 + nanos as f64 * 1e-6) / MILLIS_PER_CENTURY
}

/// Days since 1970-01-01 of a proleptic Gregorian calendar date.
pub fn days_from_civil(year: i32, month: u32, day: u32) -> i64 {
    let y = i64::from(year) - i64::from(month <= 2);
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let m = i64::from(month);
    let doy = (153 * (m + if m > 2 { -3 } else { 9 }) + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Month number (1-12) from a three-letter English abbreviation.
pub fn month_from_abbrev(s: &str) -> Option<u32> {
    let month = match s.to_ascii_uppercase().as_str() {
        "JAN" => 1,
        "FEB" => 2,
        "MAR" => 3,
        "APR" => 4,
        "MAY" => 5,
        "JUN" => 6,
        "JUL" => 7,
        "AUG" => 8,
        "SEP" => 9,
        "OCT" => 10,
        "NOV" => 11,
        "DEC" => 12,
        _ => return None,
    };
    Some(month)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn j2000_count_matches_constant() {
        let (ms, ns) = jd_to_millis(J2000_JD);
        assert_eq!(ms, J2000_MILLIS);
        assert_eq!(ns, 0);
        assert_eq!(julian_centuries(J2000_MILLIS, 0), 0.0);
    }

    #[test]
    fn origin_is_unix_epoch() {
        assert_eq!(millis_to_jd(0, 0), EPOCH_JD);
        assert_eq!(millis_to_mjd(0, 0), EPOCH_MJD);
        assert_eq!(days_from_civil(1970, 1, 1), 0);
    }

    #[test]
    fn civil_days_known_dates() {
        assert_eq!(days_from_civil(2000, 1, 1), 10_957);
        assert_eq!(days_from_civil(1972, 7, 1), 912);
        assert_eq!(days_from_civil(1969, 12, 31), -1);
    }

    #[test]
    fn mjd_roundtrip() {
        let (ms, ns) = mjd_to_millis(60_310.25);
        assert!((millis_to_mjd(ms, ns) - 60_310.25).abs() < 1e-12);
    }

    #[test]
    fn months() {
        assert_eq!(month_from_abbrev("jan"), Some(1));
        assert_eq!(month_from_abbrev("DEC"), Some(12));
        assert_eq!(month_from_abbrev("XYZ"), None);
    }
}
