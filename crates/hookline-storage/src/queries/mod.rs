// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules. Each takes `&Database` and runs on the writer thread.

pub mod conversations;
pub mod endpoints;
pub mod messages;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::Type;

/// Timestamps are stored with millisecond precision, so values handed back
/// to callers are truncated the same way.
pub(crate) fn truncate_ts(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(3)
}

pub(crate) fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn parse_ts(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_sort_lexically() {
        let a = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2026, 1, 1, 10, 0, 0).unwrap();
        assert!(format_ts(&a) < format_ts(&b));
        assert_eq!(format_ts(&a), "2026-01-01T09:00:00.000Z");
    }

    #[test]
    fn parse_reverses_format() {
        let now = truncate_ts(Utc::now());
        assert_eq!(parse_ts(0, &format_ts(&now)).unwrap(), now);
        assert!(parse_ts(0, "yesterday").is_err());
    }
}
