//! Formatting helpers for the command-line output.
//!
//! Functions that differ between compact table columns and verbose detail
//! output are parameterized via [`FmtStyle`].

use chrono::{DateTime, Local, TimeZone};

/// Controls compact (table columns) vs verbose (detail blocks) output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FmtStyle {
    /// Compact: no spaces, short suffixes ("1.5G", "3m5s")
    Compact,
    /// Detail: spaces, full suffixes ("1.5 GiB", "3m 5s")
    Detail,
}

/// Format byte count as human-readable size.
///
/// Compact: `"1.5G"`, `"100.3M"`, `"50.0K"`, `"512B"`
/// Detail:  `"1.5 GiB"`, `"100.3 MiB"`, `"50.0 KiB"`, `"512 B"`
pub fn format_bytes(bytes: u64, style: FmtStyle) -> String {
    let (t, g, m, k, b) = match style {
        FmtStyle::Compact => ("T", "G", "M", "K", "B"),
        FmtStyle::Detail => (" TiB", " GiB", " MiB", " KiB", " B"),
    };
    let f = bytes as f64;
    if bytes >= 1 << 40 {
        format!("{:.1}{}", f / (1u64 << 40) as f64, t)
    } else if bytes >= 1 << 30 {
        format!("{:.1}{}", f / (1u64 << 30) as f64, g)
    } else if bytes >= 1 << 20 {
        format!("{:.1}{}", f / (1u64 << 20) as f64, m)
    } else if bytes >= 1 << 10 {
        format!("{:.1}{}", f / 1024.0, k)
    } else {
        format!("{}{}", bytes, b)
    }
}

/// Format duration in seconds as human-readable.
///
/// Compact: `"3m5s"` (no spaces, `"-"` for negative)
/// Detail:  `"3m 5s"` (with spaces, `"0s"` for `<= 0`)
pub fn format_duration(secs: i64, style: FmtStyle) -> String {
    let sep = match style {
        FmtStyle::Compact => {
            if secs < 0 {
                return "-".to_string();
            }
            ""
        }
        FmtStyle::Detail => {
            if secs <= 0 {
                return "0s".to_string();
            }
            " "
        }
    };
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m{}{}s", secs / 60, sep, secs % 60)
    } else if secs < 86400 {
        format!("{}h{}{}m", secs / 3600, sep, (secs % 3600) / 60)
    } else {
        format!("{}d{}{}h", secs / 86400, sep, (secs % 86400) / 3600)
    }
}

/// Format CPU seconds the way `ps` prints TIME: `"M:SS.ss"`, or `"H:MM:SS"`
/// from one hour up.
pub fn format_cpu_seconds(secs: f64) -> String {
    let secs = if secs.is_finite() { secs.max(0.0) } else { 0.0 };
    let whole = secs as u64;
    if whole >= 3600 {
        format!("{}:{:02}:{:02}", whole / 3600, (whole % 3600) / 60, whole % 60)
    } else {
        format!("{}:{:05.2}", whole / 60, secs - (whole / 60 * 60) as f64)
    }
}

/// Format epoch seconds as local time (`"%Y-%m-%d %H:%M:%S"`), `"-"` for
/// zero or out-of-range values.
pub fn format_timestamp(epoch_secs: f64) -> String {
    if !epoch_secs.is_finite() || epoch_secs <= 0.0 {
        return "-".to_string();
    }
    Local
        .timestamp_opt(epoch_secs as i64, 0)
        .single()
        .map(|dt: DateTime<Local>| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Format a percentage with one decimal.
pub fn format_percent(percent: f64) -> String {
    format!("{:.1}%", percent)
}

/// Truncate a string to at most `max_len` characters, marking the cut.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_len.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512, FmtStyle::Compact), "512B");
        assert_eq!(format_bytes(512, FmtStyle::Detail), "512 B");
        assert_eq!(format_bytes(1536, FmtStyle::Compact), "1.5K");
        assert_eq!(format_bytes(16_384_000 * 1024, FmtStyle::Detail), "15.6 GiB");
        assert_eq!(format_bytes(3 << 40, FmtStyle::Compact), "3.0T");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(-1, FmtStyle::Compact), "-");
        assert_eq!(format_duration(0, FmtStyle::Detail), "0s");
        assert_eq!(format_duration(185, FmtStyle::Compact), "3m5s");
        assert_eq!(format_duration(185, FmtStyle::Detail), "3m 5s");
        assert_eq!(format_duration(12345, FmtStyle::Detail), "3h 25m");
        assert_eq!(format_duration(90000, FmtStyle::Compact), "1d1h");
    }

    #[test]
    fn test_format_cpu_seconds() {
        assert_eq!(format_cpu_seconds(0.0), "0:00.00");
        assert_eq!(format_cpu_seconds(65.5), "1:05.50");
        assert_eq!(format_cpu_seconds(3725.0), "1:02:05");
        assert_eq!(format_cpu_seconds(f64::NAN), "0:00.00");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "-");
        assert_eq!(format_timestamp(f64::INFINITY), "-");
        let formatted = format_timestamp(1_700_000_000.0);
        assert_eq!(formatted.len(), "2023-11-14 22:13:20".len());
        assert!(formatted.starts_with("2023-11-1"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("bash", 10), "bash");
        assert_eq!(truncate("/usr/lib/firefox/firefox", 8), "/usr/li…");
    }
}
