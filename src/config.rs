//! Collector configuration.
//!
//! Everything the collectors would otherwise hard-code (the procfs mount
//! point, the utmp file, kernel constants and the positional layout of
//! `/proc/[pid]/stat`) lives here so that tests and non-standard hosts can
//! override it.

use crate::error::ConfigError;

/// Reference `/proc/[pid]/stat` line used to validate a [`ProcStatLayout`].
///
/// Fields that can be negative on a real system (`tty_nr`, `tpgid`,
/// `exit_signal`) are negative here so that a layout pointing at them fails.
const REFERENCE_STAT: &str = "1 (systemd) S 0 1 1 0 -1 4194560 50000 1000000 100 500 1000 500 2000 1000 20 0 1 0 1 170000000 3000 18446744073709551615 0 0 0 0 0 0 0 0 1073745152 0 0 0 -1 0 0 0 0 0 0 0 0 0 0 0 0 0 0";

/// Positions of the fields read from `/proc/[pid]/stat`.
///
/// Indices count whitespace-separated fields after the closing `)` of the
/// comm field, so index 0 is the state letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcStatLayout {
    pub ppid: usize,
    pub utime: usize,
    pub stime: usize,
    pub cutime: usize,
    pub cstime: usize,
    pub num_threads: usize,
    pub starttime: usize,
    /// Absent on kernels before 3.5; treated as optional.
    pub exit_code: usize,
}

impl Default for ProcStatLayout {
    fn default() -> Self {
        Self {
            ppid: 1,
            utime: 11,
            stime: 12,
            cutime: 13,
            cstime: 14,
            num_threads: 17,
            starttime: 19,
            exit_code: 49,
        }
    }
}

impl ProcStatLayout {
    /// Indices that must be present in every stat line.
    pub(crate) fn required(&self) -> [(&'static str, usize); 7] {
        [
            ("ppid", self.ppid),
            ("utime", self.utime),
            ("stime", self.stime),
            ("cutime", self.cutime),
            ("cstime", self.cstime),
            ("num_threads", self.num_threads),
            ("starttime", self.starttime),
        ]
    }

    /// Checks the layout against a known-good stat line.
    ///
    /// Every index must be distinct, exist in the reference line and point at
    /// a field that decodes as an unsigned counter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let after_comm = REFERENCE_STAT
            .rfind(')')
            .map(|pos| &REFERENCE_STAT[pos + 1..])
            .unwrap_or_default();
        let fields: Vec<&str> = after_comm.split_whitespace().collect();

        let mut seen = Vec::new();
        for (name, idx) in self
            .required()
            .into_iter()
            .chain(std::iter::once(("exit_code", self.exit_code)))
        {
            if seen.contains(&idx) {
                return Err(ConfigError::StatLayout(format!(
                    "{} shares index {} with another field",
                    name, idx
                )));
            }
            seen.push(idx);

            let Some(value) = fields.get(idx) else {
                return Err(ConfigError::StatLayout(format!(
                    "{} index {} is beyond the {} stat fields",
                    name,
                    idx,
                    fields.len()
                )));
            };
            if value.parse::<u64>().is_err() {
                return Err(ConfigError::StatLayout(format!(
                    "{} index {} points at non-counter field {:?}",
                    name, idx, value
                )));
            }
        }
        Ok(())
    }
}

/// Configuration of a [`Collector`](crate::Collector).
#[derive(Debug, Clone, PartialEq)]
pub struct CollectorConfig {
    /// Mount point of the process pseudo-filesystem.
    pub proc_path: String,
    /// Session accounting file read by `users()`.
    pub utmp_path: String,
    /// Kernel clock ticks per second (`USER_HZ`).
    pub clock_ticks: f64,
    /// Memory page size in bytes.
    pub page_size: u64,
    pub stat_layout: ProcStatLayout,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            proc_path: "/proc".to_string(),
            utmp_path: "/var/run/utmp".to_string(),
            clock_ticks: system_clock_ticks(),
            page_size: system_page_size(),
            stat_layout: ProcStatLayout::default(),
        }
    }
}

impl CollectorConfig {
    pub fn with_proc_path(mut self, path: impl Into<String>) -> Self {
        self.proc_path = path.into();
        self
    }

    pub fn with_utmp_path(mut self, path: impl Into<String>) -> Self {
        self.utmp_path = path.into();
        self
    }

    pub fn with_clock_ticks(mut self, ticks: f64) -> Self {
        self.clock_ticks = ticks;
        self
    }

    pub fn with_page_size(mut self, size: u64) -> Self {
        self.page_size = size;
        self
    }

    pub fn with_stat_layout(mut self, layout: ProcStatLayout) -> Self {
        self.stat_layout = layout;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.clock_ticks.is_finite() || self.clock_ticks <= 0.0 {
            return Err(ConfigError::ClockTicks(self.clock_ticks));
        }
        if self.page_size == 0 {
            return Err(ConfigError::PageSize);
        }
        self.stat_layout.validate()
    }
}

/// Clock ticks per second, 100 if `sysconf` fails.
fn system_clock_ticks() -> f64 {
    // SAFETY: sysconf has no preconditions and only reads a constant.
    let ticks = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
    if ticks > 0 { ticks as f64 } else { 100.0 }
}

/// Page size in bytes, 4096 if `sysconf` fails.
fn system_page_size() -> u64 {
    // SAFETY: sysconf has no preconditions and only reads a constant.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 { size as u64 } else { 4096 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CollectorConfig::default();
        assert_eq!(config.proc_path, "/proc");
        assert_eq!(config.utmp_path, "/var/run/utmp");
        assert!(config.clock_ticks > 0.0);
        assert!(config.page_size > 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = CollectorConfig::default()
            .with_proc_path("/host/proc")
            .with_utmp_path("/host/run/utmp")
            .with_clock_ticks(250.0)
            .with_page_size(16384);
        assert_eq!(config.proc_path, "/host/proc");
        assert_eq!(config.utmp_path, "/host/run/utmp");
        assert_eq!(config.clock_ticks, 250.0);
        assert_eq!(config.page_size, 16384);
    }

    #[test]
    fn test_invalid_clock_ticks() {
        for ticks in [0.0, -100.0, f64::NAN, f64::INFINITY] {
            let config = CollectorConfig::default().with_clock_ticks(ticks);
            assert!(matches!(config.validate(), Err(ConfigError::ClockTicks(_))));
        }
    }

    #[test]
    fn test_invalid_page_size() {
        let config = CollectorConfig::default().with_page_size(0);
        assert_eq!(config.validate(), Err(ConfigError::PageSize));
    }

    #[test]
    fn test_layout_pointing_at_state_is_rejected() {
        let layout = ProcStatLayout {
            utime: 0,
            ..ProcStatLayout::default()
        };
        let err = layout.validate().unwrap_err();
        assert!(err.to_string().contains("utime"));
    }

    #[test]
    fn test_layout_pointing_at_signed_field_is_rejected() {
        // tpgid is -1 in the reference line
        let layout = ProcStatLayout {
            starttime: 5,
            ..ProcStatLayout::default()
        };
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_layout_duplicate_and_out_of_range() {
        let dup = ProcStatLayout {
            stime: 11,
            ..ProcStatLayout::default()
        };
        assert!(dup.validate().unwrap_err().to_string().contains("shares"));

        let far = ProcStatLayout {
            exit_code: 80,
            ..ProcStatLayout::default()
        };
        assert!(far.validate().unwrap_err().to_string().contains("beyond"));
    }
}
