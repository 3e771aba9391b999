// src/version.rs

//! Agent version classification
//!
//! Package pins arrive as free-form strings in [epoch:]version[-release]
//! form, possibly with `~rc` pre-release suffixes or a second `-` separated
//! Windows build tag. Only the leading major integer matters downstream
//! (repository channel selection, platform naming), so classification
//! extracts that and keeps the raw string for package pinning.

use crate::error::{Error, Result};
use std::fmt;

/// Major version used when the pin is the floating `latest` and no explicit
/// major version was supplied.
pub const DEFAULT_MAJOR_VERSION: u32 = 7;

/// A classified agent version: the raw pin plus its major version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AgentVersion {
    pub raw: String,
    pub major: u32,
}

impl AgentVersion {
    /// Classify a version identifier string.
    ///
    /// Strips an optional `<digits>:` epoch marker, then takes the first run
    /// of digits up to the first `.` (or any non-digit) as the major version.
    /// Everything after that run is ignored.
    ///
    /// Examples:
    /// - "6.15.1" → 6
    /// - "1:6.15.1~rc.1-1" → 6
    /// - "1:6.15.1-rc.1-1" → 6
    /// - "7.15.1" → 7
    pub fn classify(raw: &str) -> Result<Self> {
        let rest = strip_epoch(raw);

        let digits: String = rest
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();

        let major = digits
            .parse::<u32>()
            .map_err(|_| Error::InvalidVersionFormat {
                raw: raw.to_string(),
            })?;

        Ok(Self {
            raw: raw.to_string(),
            major,
        })
    }

    /// Repository channel the classified version selects, e.g. "stable 7".
    ///
    /// The repo-file collaborator substitutes this into the apt/yum source
    /// definition without further logic.
    pub fn repo_channel(&self) -> String {
        repo_channel_for(self.major)
    }
}

/// Render the repository channel for a major version, e.g. "stable 7".
///
/// Single source of the channel format; used both for classified versions
/// and for an explicitly supplied major version.
pub fn repo_channel_for(major: u32) -> String {
    format!("stable {major}")
}

impl fmt::Display for AgentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Strip a leading `<digits>:` epoch marker, if present
fn strip_epoch(s: &str) -> &str {
    if let Some(colon_pos) = s.find(':') {
        let (epoch, rest) = s.split_at(colon_pos);
        if !epoch.is_empty() && epoch.chars().all(|c| c.is_ascii_digit()) {
            return &rest[1..];
        }
    }
    s
}
