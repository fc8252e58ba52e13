//! Access-code deframing of bit streams.
//!
//! A [Deframer] scans an unbounded stream of bits for a syncword (an access code and an
//! optional tail sync concatenated), tolerating up to a threshold of bit errors, and slices
//! the stream into fixed-length [Frame]s. Recovery after each frame is controlled by a
//! [RecoveryPolicy], and the treatment of the syncword in the output by an [OutputPolicy].
//!
//! ```
//! use pdu_utils::deframer::{Deframer, DeframerConfig};
//!
//! let config = DeframerConfig::builder()
//!     .access_code("0b10110100")
//!     .burst_len(16)
//!     .build();
//! let mut deframer = Deframer::new(&config).unwrap();
//!
//! let mut bits = vec![1, 1, 1];
//! bits.extend([1, 0, 1, 1, 0, 1, 0, 0].repeat(6));
//! let frames = deframer.push_bits(&bits);
//!
//! assert_eq!(frames.len(), 3);
//! assert_eq!(frames[0].start_position, 3);
//! assert_eq!(frames[0].payload, [1, 0, 1, 1, 0, 1, 0, 0]);
//! ```
mod bits;
mod config;
mod correlator;
mod engine;
mod pattern;
mod policy;
mod stream;

pub use bits::*;
pub use config::*;
pub use correlator::hamming_distance;
pub use engine::*;
pub use pattern::*;
pub use policy::*;
pub use stream::*;

use crate::pdu::{Pdu, BIT_INDEX, BIT_REVERSED, PDU_NUM};

/// A frame found in a bit stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Stream position of the first bit of the syncword.
    pub start_position: u64,
    /// Zero-based count of frames emitted before this one.
    pub frame_index: u64,
    /// True if the syncword was found with inverted polarity.
    pub reversed: bool,
    /// Number of bit errors in the syncword when it was accepted.
    pub errors: usize,
    /// Unpacked payload bits, as determined by the [OutputPolicy] in effect.
    pub payload: Vec<u8>,
}

impl Frame {
    /// Convert to a [Pdu] carrying the `bit_reversed`, `pdu_num`, and `bit_index` metadata.
    #[must_use]
    pub fn into_pdu(self) -> Pdu {
        Pdu::new(self.payload)
            .with_meta(BIT_REVERSED, self.reversed)
            .with_meta(PDU_NUM, self.frame_index)
            .with_meta(BIT_INDEX, self.start_position)
    }
}

impl From<Frame> for Pdu {
    fn from(frame: Frame) -> Self {
        frame.into_pdu()
    }
}
