use std::fmt;

use serde::Serialize;

const RELEASE_PREFIX: &str = "Release ";
const FIXPACK_MARKER: &str = "FP";
const HOTFIX_MARKER: &str = "HF";

/// Canonical, totally ordered encoding of a product release:
/// `major * 1_000_000 + minor * 10_000 + qmr * 100 + fixpack`.
///
/// Zero means the version string could not be read and sorts lowest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct BuildNumber(u64);

impl BuildNumber {
    pub const UNKNOWN: Self = Self(0);

    pub fn from_parts(major: u64, minor: u64, qmr: u64, fixpack: u64) -> Self {
        Self(
            major
                .saturating_mul(1_000_000)
                .saturating_add(minor.saturating_mul(10_000))
                .saturating_add(qmr.saturating_mul(100))
                .saturating_add(fixpack),
        )
    }

    pub fn is_unknown(self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for BuildNumber {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for BuildNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of reading a free-form version string. The hotfix counter never
/// takes part in ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParsedVersion {
    pub build: BuildNumber,
    pub hotfix: u32,
}

/// Parses strings such as `Release 12.0.2FP3HF1`, `12.0.1` or `14FP2`.
///
/// Never fails: anything unreadable collapses to build `0`, hotfix `0`.
pub fn parse_version(raw: &str) -> ParsedVersion {
    let version = match raw.strip_prefix(RELEASE_PREFIX) {
        Some(rest) if !rest.is_empty() => rest,
        _ => raw,
    };

    let mut cursor = version;
    let major = take_number(&mut cursor);
    let minor = take_number(&mut cursor);
    let qmr = take_number(&mut cursor);
    let tail = cursor;

    let fixpack = number_after_marker(tail, FIXPACK_MARKER);
    let hotfix = number_after_marker(tail, HOTFIX_MARKER);

    ParsedVersion {
        build: BuildNumber::from_parts(major, minor, qmr, fixpack),
        hotfix: u32::try_from(hotfix).unwrap_or(u32::MAX),
    }
}

fn number_after_marker(tail: &str, marker: &str) -> u64 {
    match tail.find(marker) {
        Some(index) => {
            let mut rest = &tail[index + marker.len()..];
            take_number(&mut rest)
        }
        None => 0,
    }
}

/// Reads one numeric run from the front of `cursor`.
///
/// Leading blanks are skipped. A dot terminates the run and is consumed; any
/// other non-digit terminates the run and is left in place for the caller.
fn take_number(cursor: &mut &str) -> u64 {
    let trimmed = cursor.trim_start_matches(' ');
    let mut value: u64 = 0;
    let mut consumed = 0;

    for ch in trimmed.chars() {
        if let Some(digit) = ch.to_digit(10) {
            value = value.saturating_mul(10).saturating_add(u64::from(digit));
            consumed += ch.len_utf8();
            continue;
        }
        if ch == '.' {
            consumed += ch.len_utf8();
        }
        break;
    }

    *cursor = &trimmed[consumed..];
    value
}
