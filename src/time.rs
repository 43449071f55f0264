//! Clock abstraction and the `validUntil` / `cacheDuration` expiry policy.

use chrono::{DateTime, Months, NaiveDateTime, TimeDelta, TimeZone, Utc};

use crate::error::{MetadataError, MetadataResult};

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// An `xs:duration` value split into its calendar and exact parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct XsDuration {
    pub negative: bool,
    pub months: u32,
    pub seconds: i64,
    pub nanos: u32,
}

impl XsDuration {
    /// `base` shifted by this duration; `None` on overflow.
    pub fn apply(&self, base: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let months = Months::new(self.months);
        let exact = TimeDelta::try_seconds(self.seconds)?
            .checked_add(&TimeDelta::nanoseconds(i64::from(self.nanos)))?;
        if self.negative {
            base.checked_sub_months(months)?.checked_sub_signed(exact)
        } else {
            base.checked_add_months(months)?.checked_add_signed(exact)
        }
    }
}

/// Parse an `xs:duration` such as `PT604800S`, `P1Y2M3DT4H5M6.5S` or `-P1D`.
pub fn parse_duration(value: &str) -> Option<XsDuration> {
    let (negative, rest) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value),
    };
    let rest = rest.strip_prefix('P')?;
    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (rest, None),
    };

    let mut duration = XsDuration {
        negative,
        ..XsDuration::default()
    };
    let mut seen_any = false;

    for (number, designator) in components(date_part, "YMD")? {
        let n: u32 = number.parse().ok()?;
        match designator {
            'Y' => duration.months = duration.months.checked_add(n.checked_mul(12)?)?,
            'M' => duration.months = duration.months.checked_add(n)?,
            _ => duration.seconds = add_seconds(duration.seconds, i64::from(n), 86_400)?,
        }
        seen_any = true;
    }

    if let Some(time_part) = time_part {
        let parts = components(time_part, "HMS")?;
        if parts.is_empty() {
            return None;
        }
        for (number, designator) in parts {
            match designator {
                'H' => duration.seconds = add_seconds(duration.seconds, number.parse().ok()?, 3_600)?,
                'M' => duration.seconds = add_seconds(duration.seconds, number.parse().ok()?, 60)?,
                _ => {
                    let (whole, fraction) = match number.split_once('.') {
                        Some((whole, fraction)) => (whole, fraction),
                        None => (number, ""),
                    };
                    if whole.is_empty() && fraction.is_empty() {
                        return None;
                    }
                    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
                    duration.seconds = add_seconds(duration.seconds, whole, 1)?;
                    duration.nanos = parse_nanos(fraction)?;
                }
            }
        }
        seen_any = true;
    }

    seen_any.then_some(duration)
}

fn add_seconds(total: i64, n: i64, unit: i64) -> Option<i64> {
    total.checked_add(n.checked_mul(unit)?)
}

fn parse_nanos(fraction: &str) -> Option<u32> {
    if fraction.is_empty() {
        return Some(0);
    }
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits: String = fraction.chars().chain("000000000".chars()).take(9).collect();
    digits.parse().ok()
}

/// Split `3DT` style text into `(number, designator)` pairs, enforcing the
/// designator order given by `allowed`. Only the seconds field may carry a
/// decimal point.
fn components<'a>(text: &'a str, allowed: &str) -> Option<Vec<(&'a str, char)>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut last_rank: Option<usize> = None;

    for (i, c) in text.char_indices() {
        if c.is_ascii_digit() || c == '.' {
            continue;
        }
        let rank = allowed.find(c)?;
        if last_rank.is_some_and(|last| rank <= last) {
            return None;
        }
        let number = &text[start..i];
        if number.is_empty() || (number.contains('.') && c != 'S') {
            return None;
        }
        out.push((number, c));
        last_rank = Some(rank);
        start = i + c.len_utf8();
    }

    if start != text.len() {
        return None;
    }
    Some(out)
}

/// Parse an `xs:dateTime`. A value without a zone is taken as UTC.
pub fn parse_date_time(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Compute when a metadata document stops being valid.
///
/// `cacheDuration` is measured from `now`; `validUntil` is absolute. When
/// both are present the earlier instant wins. Empty values count as absent.
/// Returns `None` when neither attribute constrains the document.
pub fn expire_time(
    cache_duration: Option<&str>,
    valid_until: Option<&str>,
    now: DateTime<Utc>,
) -> MetadataResult<Option<DateTime<Utc>>> {
    let mut expires = None;

    if let Some(value) = cache_duration.filter(|v| !v.is_empty()) {
        let at = parse_duration(value)
            .and_then(|d| d.apply(now))
            .ok_or_else(|| MetadataError::InvalidTime {
                attribute: "cacheDuration",
                value: value.to_string(),
            })?;
        expires = Some(at);
    }

    if let Some(value) = valid_until.filter(|v| !v.is_empty()) {
        let at = parse_date_time(value).ok_or_else(|| MetadataError::InvalidTime {
            attribute: "validUntil",
            value: value.to_string(),
        })?;
        expires = Some(match expires {
            Some(current) if current < at => current,
            _ => at,
        });
    }

    tracing::debug!(?expires, "computed metadata expiration");
    Ok(expires)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        parse_date_time(s).unwrap()
    }

    #[test]
    fn parses_common_durations() {
        let d = parse_duration("PT604800S").unwrap();
        assert_eq!(d.seconds, 604_800);
        assert_eq!(d.months, 0);
        assert!(!d.negative);

        let d = parse_duration("P1Y2M3DT4H5M6.25S").unwrap();
        assert_eq!(d.months, 14);
        assert_eq!(d.seconds, 3 * 86_400 + 4 * 3_600 + 5 * 60 + 6);
        assert_eq!(d.nanos, 250_000_000);

        let d = parse_duration("-P1D").unwrap();
        assert!(d.negative);
        assert_eq!(d.seconds, 86_400);
    }

    #[test]
    fn rejects_malformed_durations() {
        for bad in ["", "P", "PT", "1D", "P1H", "PT1D", "P1D2Y", "P1.5D", "PT1S2M", "P-1D", "PxD"] {
            assert!(parse_duration(bad).is_none(), "accepted {bad}");
        }
    }

    #[test]
    fn duration_applies_calendar_months() {
        let base = at("2024-01-31T00:00:00Z");
        let shifted = parse_duration("P1M").unwrap().apply(base).unwrap();
        assert_eq!(shifted, at("2024-02-29T00:00:00Z"));

        let back = parse_duration("-PT1H").unwrap().apply(base).unwrap();
        assert_eq!(back, at("2024-01-30T23:00:00Z"));
    }

    #[test]
    fn parses_date_times_with_and_without_zone() {
        assert_eq!(at("2030-01-01T00:00:00Z"), at("2030-01-01T01:00:00+01:00"));
        assert_eq!(
            parse_date_time("2030-01-01T00:00:00").unwrap(),
            at("2030-01-01T00:00:00Z")
        );
        assert_eq!(
            parse_date_time("2030-01-01T00:00:00.123Z").unwrap().timestamp_subsec_millis(),
            123
        );
        assert!(parse_date_time("tomorrow").is_none());
    }

    #[test]
    fn expire_time_policy() {
        let now = at("2026-01-01T00:00:00Z");

        assert_eq!(expire_time(None, None, now).unwrap(), None);
        assert_eq!(expire_time(Some(""), Some(""), now).unwrap(), None);

        assert_eq!(
            expire_time(Some("PT1H"), None, now).unwrap(),
            Some(at("2026-01-01T01:00:00Z"))
        );
        assert_eq!(
            expire_time(None, Some("2025-06-01T00:00:00Z"), now).unwrap(),
            Some(at("2025-06-01T00:00:00Z"))
        );

        // the earlier of the two wins
        assert_eq!(
            expire_time(Some("P7D"), Some("2026-01-02T00:00:00Z"), now).unwrap(),
            Some(at("2026-01-02T00:00:00Z"))
        );
        assert_eq!(
            expire_time(Some("PT1H"), Some("2027-01-01T00:00:00Z"), now).unwrap(),
            Some(at("2026-01-01T01:00:00Z"))
        );
    }

    #[test]
    fn expire_time_rejects_bad_values() {
        let now = at("2026-01-01T00:00:00Z");
        assert!(matches!(
            expire_time(Some("soon"), None, now),
            Err(MetadataError::InvalidTime { attribute: "cacheDuration", .. })
        ));
        assert!(matches!(
            expire_time(None, Some("never"), now),
            Err(MetadataError::InvalidTime { attribute: "validUntil", .. })
        ));
    }

    #[test]
    fn fixed_clock_is_fixed() {
        let clock = FixedClock(at("2026-01-01T00:00:00Z"));
        assert_eq!(clock.now(), clock.now());
    }
}
