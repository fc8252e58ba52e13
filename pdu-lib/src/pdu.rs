//! The generic PDU message shape: a metadata dictionary plus a payload vector.
//!
//! Every block in this crate that produces discrete messages produces [Pdu]s so
//! that consumers can treat them uniformly, whatever their origin.
use std::collections::BTreeMap;
use std::fmt::Display;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Metadata key indicating the frame was found with inverted polarity.
pub const BIT_REVERSED: &str = "bit_reversed";
/// Metadata key for the zero-based sequence number of an emitted frame.
pub const PDU_NUM: &str = "pdu_num";
/// Metadata key for the absolute stream position of the first frame bit.
pub const BIT_INDEX: &str = "bit_index";

/// A metadata value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(untagged))]
pub enum Value {
    Bool(bool),
    U64(u64),
}

impl Value {
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::U64(_) => None,
        }
    }

    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::U64(v) => Some(*v),
            Value::Bool(_) => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::U64(value)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::U64(v) => write!(f, "{v}"),
        }
    }
}

pub type Metadata = BTreeMap<String, Value>;

/// Protocol data unit; metadata plus a payload of unpacked bits (one bit per byte).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pdu {
    pub meta: Metadata,
    pub data: Vec<u8>,
}

impl Pdu {
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Pdu {
            meta: Metadata::default(),
            data,
        }
    }

    /// Add, or replace, a metadata entry.
    #[must_use]
    pub fn with_meta<V: Into<Value>>(mut self, key: &str, value: V) -> Self {
        self.meta.insert(key.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.meta.get(key)
    }
}
