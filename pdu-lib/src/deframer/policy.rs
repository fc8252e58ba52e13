use std::fmt::Display;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// What is done with the sync window bits of a found frame before it is emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum OutputPolicy {
    /// Trim the syncword(s); the payload is only the bits following the window.
    #[default]
    Discard,
    /// Replace the received window with the canonical syncword(s).
    Fix,
    /// Emit the window exactly as received, including any tolerated bit errors.
    Keep,
}

/// How the deframer resumes searching once a frame is found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum RecoveryPolicy {
    /// Lock to the frame cadence after the first frame and only check for the next
    /// syncword directly after each frame. Any failed check drops the lock.
    #[default]
    Strict,
    /// Start a fresh bit-by-bit search after every frame.
    Reset,
    /// Correlate continuously, including inverted polarity, accepting any candidate that
    /// does not overlap the frame in progress.
    Permissive,
}

impl OutputPolicy {
    const NAMES: [(&'static str, Self); 3] = [
        ("discard", Self::Discard),
        ("fix", Self::Fix),
        ("keep", Self::Keep),
    ];
}

impl RecoveryPolicy {
    const NAMES: [(&'static str, Self); 3] = [
        ("strict", Self::Strict),
        ("reset", Self::Reset),
        ("permissive", Self::Permissive),
    ];
}

macro_rules! named_policy {
    ($ty:ty, $kind:literal) => {
        impl FromStr for $ty {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let name = s.trim().to_lowercase();
                Self::NAMES
                    .iter()
                    .find(|(n, _)| *n == name)
                    .map(|(_, v)| *v)
                    .ok_or_else(|| ConfigError::UnknownName {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }

        impl Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let name = Self::NAMES
                    .iter()
                    .find(|(_, v)| v == self)
                    .map_or("unknown", |(n, _)| n);
                f.write_str(name)
            }
        }
    };
}

named_policy!(OutputPolicy, "output policy");
named_policy!(RecoveryPolicy, "recovery policy");
