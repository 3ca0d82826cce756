//! Walltime parsing and formatting for batch directives.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

static HMS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{1,2}):(\d{1,2})$").expect("walltime pattern is valid")
});

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WallTimeError {
    #[error("Invalid walltime {0:?}; expected integer seconds or H:MM:SS")]
    Invalid(String),
}

/// A job walltime, displayed as `H:MM:SS`.
///
/// Hours are unbounded, so a 36 hour run renders as `36:00:00`
/// rather than rolling over into days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct WallTime {
    seconds: u64,
}

impl WallTime {
    pub fn from_secs(seconds: u64) -> Self {
        Self { seconds }
    }

    pub fn as_secs(&self) -> u64 {
        self.seconds
    }
}

impl FromStr for WallTime {
    type Err = WallTimeError;

    /// Parse `H:MM:SS`, `HH:MM:SS`, or a bare integer number of seconds.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(seconds) = trimmed.parse::<u64>() {
            return Ok(Self::from_secs(seconds));
        }

        let invalid = || WallTimeError::Invalid(s.to_string());
        let caps = HMS.captures(trimmed).ok_or_else(invalid)?;
        let field = |i: usize| caps[i].parse::<u64>().map_err(|_| invalid());
        let (hours, minutes, seconds) = (field(1)?, field(2)?, field(3)?);
        if minutes >= 60 || seconds >= 60 {
            return Err(invalid());
        }
        hours
            .checked_mul(3600)
            .and_then(|secs| secs.checked_add(minutes * 60 + seconds))
            .map(Self::from_secs)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for WallTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.seconds / 3600;
        let mins = (self.seconds % 3600) / 60;
        let secs = self.seconds % 60;
        write!(f, "{}:{:02}:{:02}", hours, mins, secs)
    }
}
