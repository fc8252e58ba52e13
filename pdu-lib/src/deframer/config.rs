#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use super::{OutputPolicy, RecoveryPolicy};

/// Options used to construct a [Deframer](super::Deframer).
///
/// Patterns are given as text, see [SyncPattern](super::SyncPattern) for the accepted
/// forms; they are validated when the deframer is constructed.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeframerConfig {
    /// Primary syncword.
    #[builder(setter(into))]
    pub access_code: String,
    /// Secondary syncword, expected directly after the access code. Empty for none.
    #[builder(default, setter(into))]
    #[cfg_attr(feature = "serde", serde(default))]
    pub tail_sync: String,
    /// Total frame length in bits, including the syncword(s).
    pub burst_len: usize,
    /// Maximum number of bit errors tolerated over both syncwords.
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde(default))]
    pub threshold: usize,
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde(default))]
    pub output: OutputPolicy,
    #[builder(default)]
    #[cfg_attr(feature = "serde", serde(default))]
    pub recovery: RecoveryPolicy,
}
