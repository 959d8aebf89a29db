// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use jiff::{Timestamp, tz::TimeZone};

/// The output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

/// Formats a nutrition amount with at most one decimal, dropping a trailing `.0`.
pub fn format_amount(v: f64) -> String {
    let s = format!("{v:.1}");
    match s.strip_suffix(".0") {
        Some(int) if int == "-0" => "0".to_string(),
        Some(int) => int.to_string(),
        None => s,
    }
}

/// Formats a millisecond timestamp as local `HH:MM`.
pub fn format_time(ms: i64, tz: &TimeZone) -> String {
    match Timestamp::from_millisecond(ms) {
        Ok(ts) => ts.to_zoned(tz.clone()).strftime("%H:%M").to_string(),
        Err(e) => {
            tracing::warn!(ms, err = %e, "timestamp out of range");
            "--:--".to_string()
        }
    }
}

/// Parses a non-negative nutrition amount.
pub fn parse_amount(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if !v.is_finite() || v < 0.0 {
        return Err(format!("must be a non-negative number, got {s}"));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(95.0), "95");
        assert_eq!(format_amount(0.3), "0.3");
        assert_eq!(format_amount(12.345), "12.3");
        assert_eq!(format_amount(-0.01), "0");
        assert_eq!(format_amount(-120.0), "-120");
    }

    #[test]
    fn test_format_time() {
        // 2025-03-14T12:34:00Z
        assert_eq!(format_time(1_741_955_640_000, &TimeZone::UTC), "12:34");
        assert_eq!(format_time(i64::MAX, &TimeZone::UTC), "--:--");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("12.5"), Ok(12.5));
        assert_eq!(parse_amount("0"), Ok(0.0));
        assert!(parse_amount("-1").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("inf").is_err());
        assert!(parse_amount("NaN").is_err());
    }
}
