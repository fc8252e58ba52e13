use std::io::Read;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{bounded, Receiver};
use tracing::{debug, trace};

use super::{BitFormat, Bits, Deframer, Frame};
use crate::Result;

/// Iterates over the [Frame]s found in a byte stream. Created using [deframe].
///
/// ## Errors
/// Any read error is passed on, after which the iterator ends. A partial frame at the end
/// of the stream is dropped.
pub struct FrameIter<R>
where
    R: Read,
{
    bits: Bits<R>,
    deframer: Deframer,
}

impl<R> FrameIter<R>
where
    R: Read,
{
    /// The deframer driven by this iterator, e.g., to inspect its [Stats](super::Stats).
    pub fn deframer(&self) -> &Deframer {
        &self.deframer
    }

    pub fn into_deframer(self) -> Deframer {
        self.deframer
    }
}

impl<R> Iterator for FrameIter<R>
where
    R: Read,
{
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        for zult in self.bits.by_ref() {
            match zult {
                Ok(bit) => {
                    if let Some(frame) = self.deframer.push(bit) {
                        return Some(Ok(frame));
                    }
                }
                Err(err) => return Some(Err(err)),
            }
        }
        trace!(position = self.deframer.position(), "end of bit stream");
        None
    }
}

/// Creates an iterator that produces the frames found by `deframer` in the bits read
/// from `reader`.
///
/// ```
/// use pdu_utils::deframer::{deframe, BitFormat, Deframer, DeframerConfig};
///
/// let config = DeframerConfig::builder().access_code("0xb4").burst_len(16).build();
/// let deframer = Deframer::new(&config).unwrap();
/// let stream: &[u8] = &[0x00, 0xb4, 0xff, 0x00];
///
/// let frames: Vec<_> = deframe(stream, deframer, BitFormat::Packed)
///     .map(Result::unwrap)
///     .collect();
/// assert_eq!(frames.len(), 1);
/// assert_eq!(frames[0].start_position, 8);
/// assert_eq!(frames[0].payload, [1; 8]);
/// ```
pub fn deframe<R>(reader: R, deframer: Deframer, format: BitFormat) -> FrameIter<R>
where
    R: Read,
{
    FrameIter {
        bits: Bits::new(reader, format),
        deframer,
    }
}

/// Frames produced by a deframer running on a background thread. Created using
/// [spawn_deframer].
pub struct BackgroundFrames {
    frames: Receiver<Result<Frame>>,
    handle: JoinHandle<Deframer>,
}

impl BackgroundFrames {
    /// Stop receiving frames and return the deframer once its thread exits, or `None`
    /// if the thread panicked.
    pub fn finish(self) -> Option<Deframer> {
        drop(self.frames);
        self.handle.join().ok()
    }
}

impl Iterator for BackgroundFrames {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        self.frames.recv().ok()
    }
}

/// Run deframing of `reader` in a background thread.
///
/// Frames are handed over a bounded channel, so the reader is only consumed as fast as the
/// returned iterator is. The thread exits at the end of the stream, on a read error, or
/// when the iterator is dropped.
///
/// # Errors
/// [Error::Io](crate::Error::Io) if the thread cannot be started.
pub fn spawn_deframer<R>(reader: R, deframer: Deframer, format: BitFormat) -> Result<BackgroundFrames>
where
    R: Read + Send + 'static,
{
    const DEFAULT_BUFFER_SIZE: usize = 1024;
    let (frames_tx, frames_rx) = bounded(DEFAULT_BUFFER_SIZE);

    let handle = thread::Builder::new()
        .name("deframer".into())
        .spawn(move || {
            let mut frames = deframe(reader, deframer, format);
            for zult in frames.by_ref() {
                if frames_tx.send(zult).is_err() {
                    debug!("frame receiver dropped; stopping");
                    break;
                }
            }
            frames.into_deframer()
        })?;

    Ok(BackgroundFrames {
        frames: frames_rx,
        handle,
    })
}
