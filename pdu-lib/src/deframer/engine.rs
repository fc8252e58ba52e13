use tracing::{debug, trace};

use super::correlator::{inverted_distance, History};
use super::{DeframerConfig, Frame, OutputPolicy, RecoveryPolicy, SyncPattern};
use crate::{ConfigError, Result};

/// Observable state of the recovery state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Correlating every new bit.
    Searching,
    /// A syncword was accepted and the frame bits are being collected.
    Accumulating,
    /// Strict cadence established; only the position directly after each frame is checked.
    Locked,
}

/// Running counters for a [Deframer].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Bits consumed, i.e., the current stream position.
    pub bits: u64,
    /// Frames emitted.
    pub frames: u64,
    /// Frames emitted with inverted polarity.
    pub reversed: u64,
    /// Matching windows ignored because they overlap a committed frame.
    pub overlapping: u64,
    /// Number of times a strict lock was dropped.
    pub lock_losses: u64,
}

// A frame whose syncword was accepted but which does not yet have all its bits.
#[derive(Debug, Clone)]
struct Pending {
    start: u64,
    reversed: bool,
    errors: usize,
    // Captured when accepted so setters only affect later frames
    burst_len: usize,
    output: OutputPolicy,
    recovery: RecoveryPolicy,
    sync: SyncPattern,
}

impl Pending {
    fn end(&self) -> u64 {
        self.start + self.burst_len as u64
    }
}

fn validate(
    access_code: &SyncPattern,
    tail_sync: &SyncPattern,
    burst_len: usize,
    recovery: RecoveryPolicy,
) -> std::result::Result<(), ConfigError> {
    if burst_len == 0 {
        return Err(ConfigError::ZeroBurstLength);
    }
    if access_code.is_empty() && recovery != RecoveryPolicy::Strict {
        return Err(ConfigError::EmptyAccessCode);
    }
    let sync_len = access_code.len() + tail_sync.len();
    if sync_len > burst_len {
        return Err(ConfigError::BurstTooShort {
            burst_len,
            sync_len,
        });
    }
    Ok(())
}

/// Bit stream frame synchronizer.
///
/// Bits are fed one at a time with [Deframer::push]; a [Frame] is returned once all
/// `burst_len` bits following an accepted syncword have arrived. The deframer owns all of
/// its state and never blocks, so it can be driven by any bit source, see
/// [deframe](super::deframe) for reading from a [std::io::Read].
///
/// A window of the stream is accepted as a syncword if its Hamming distance from the
/// effective pattern (access code followed by tail sync) is no more than the threshold. In
/// [RecoveryPolicy::Permissive] mode the inverted window is also checked, and forward
/// matches take priority. A window is never accepted if it starts before the end of the
/// last accepted frame, so frames never overlap.
#[derive(Debug, Clone)]
pub struct Deframer {
    access_code: SyncPattern,
    tail_sync: SyncPattern,
    // access_code + tail_sync
    pattern: SyncPattern,
    burst_len: usize,
    threshold: usize,
    output: OutputPolicy,
    recovery: RecoveryPolicy,

    history: History,
    pending: Option<Pending>,
    locked: bool,
    // End position of the most recently accepted frame; no window may start before it.
    horizon: u64,
    stats: Stats,
}

impl Deframer {
    /// Create a new deframer.
    ///
    /// # Errors
    /// [Error::Config](crate::Error::Config) if either pattern cannot be parsed, the access
    /// code is empty in reset or permissive mode, or `burst_len` is zero or shorter than the
    /// syncwords.
    pub fn new(config: &DeframerConfig) -> Result<Self> {
        let access_code: SyncPattern = config.access_code.parse()?;
        let tail_sync: SyncPattern = config.tail_sync.parse()?;
        validate(&access_code, &tail_sync, config.burst_len, config.recovery)?;

        debug!(
            access_code = %access_code,
            tail_sync = %tail_sync,
            burst_len = config.burst_len,
            threshold = config.threshold,
            output = %config.output,
            recovery = %config.recovery,
            "new deframer"
        );

        Ok(Deframer {
            pattern: access_code.concat(&tail_sync),
            access_code,
            tail_sync,
            burst_len: config.burst_len,
            threshold: config.threshold,
            output: config.output,
            recovery: config.recovery,
            history: History::with_capacity(config.burst_len + 1),
            pending: None,
            locked: false,
            horizon: 0,
            stats: Stats::default(),
        })
    }

    /// The current configuration. Patterns are reported as plain binary digits.
    #[must_use]
    pub fn config(&self) -> DeframerConfig {
        DeframerConfig {
            access_code: self.access_code.to_string(),
            tail_sync: self.tail_sync.to_string(),
            burst_len: self.burst_len,
            threshold: self.threshold,
            output: self.output,
            recovery: self.recovery,
        }
    }

    /// The effective pattern, i.e., the access code followed by the tail sync.
    #[must_use]
    pub fn pattern(&self) -> &SyncPattern {
        &self.pattern
    }

    /// Current stream position, the number of bits consumed since creation.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.history.position()
    }

    #[must_use]
    pub fn stats(&self) -> Stats {
        self.stats
    }

    #[must_use]
    pub fn state(&self) -> SyncState {
        if self.locked {
            SyncState::Locked
        } else if self.pending.is_some() {
            SyncState::Accumulating
        } else {
            SyncState::Searching
        }
    }

    /// Set the primary syncword.
    ///
    /// # Errors
    /// [Error::Config](crate::Error::Config) as for [Deframer::new]; the deframer is
    /// unchanged on error.
    pub fn set_access_code(&mut self, access_code: &str) -> Result<()> {
        let access_code: SyncPattern = access_code.parse()?;
        validate(&access_code, &self.tail_sync, self.burst_len, self.recovery)?;
        self.pattern = access_code.concat(&self.tail_sync);
        self.access_code = access_code;
        Ok(())
    }

    /// Set the secondary syncword.
    ///
    /// # Errors
    /// [Error::Config](crate::Error::Config) as for [Deframer::new]; the deframer is
    /// unchanged on error.
    pub fn set_tail_sync(&mut self, tail_sync: &str) -> Result<()> {
        let tail_sync: SyncPattern = tail_sync.parse()?;
        validate(&self.access_code, &tail_sync, self.burst_len, self.recovery)?;
        self.pattern = self.access_code.concat(&tail_sync);
        self.tail_sync = tail_sync;
        Ok(())
    }

    /// Set the frame length used for frames accepted after this call.
    ///
    /// # Errors
    /// [Error::Config](crate::Error::Config) if zero or shorter than the syncwords.
    pub fn set_burst_len(&mut self, burst_len: usize) -> Result<()> {
        validate(&self.access_code, &self.tail_sync, burst_len, self.recovery)?;
        self.burst_len = burst_len;
        Ok(())
    }

    pub fn set_threshold(&mut self, threshold: usize) {
        self.threshold = threshold;
    }

    /// Set the output policy used for frames accepted after this call.
    pub fn set_output_policy(&mut self, output: OutputPolicy) {
        self.output = output;
    }

    /// Set the recovery policy. Any strict lock is dropped. A frame in progress is completed
    /// under the policy in effect when its syncword was accepted.
    ///
    /// # Errors
    /// [Error::Config](crate::Error::Config) if reset or permissive is requested with an
    /// empty access code.
    pub fn set_recovery_policy(&mut self, recovery: RecoveryPolicy) -> Result<()> {
        validate(&self.access_code, &self.tail_sync, self.burst_len, recovery)?;
        self.recovery = recovery;
        self.locked = false;
        Ok(())
    }

    /// Discard any frame in progress along with all correlation state. The stream position
    /// and frame count continue from where they were.
    pub fn reset(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!(bit_index = pending.start, "dropping incomplete frame");
        }
        self.locked = false;
        self.history.clear();
        self.horizon = self.history.position();
    }

    /// Consume a single bit, returning a [Frame] if this bit completes one.
    ///
    /// Only the low bit of `bit` is used.
    pub fn push(&mut self, bit: u8) -> Option<Frame> {
        // An empty pattern matches the zero-length window before the bit arrives
        if self.pattern.is_empty() {
            self.correlate();
        }

        self.history.push(bit);
        self.stats.bits += 1;
        let keep = self
            .pending
            .as_ref()
            .map_or(self.burst_len, |p| p.burst_len.max(self.burst_len));
        self.history.trim(keep);

        let completed = self.complete();
        if !self.pattern.is_empty() {
            self.correlate();
        }
        // A second check only completes when the syncword fills the whole burst
        completed.or_else(|| self.complete())
    }

    /// Consume all `bits`, returning frames in the order they complete.
    pub fn push_bits(&mut self, bits: &[u8]) -> Vec<Frame> {
        bits.iter().filter_map(|b| self.push(*b)).collect()
    }

    // Check the window ending at the current position against the pattern.
    fn correlate(&mut self) {
        let sync_len = self.pattern.len();
        let position = self.history.position();
        let permissive = self.recovery == RecoveryPolicy::Permissive;

        // Strict and reset do not look for syncwords while collecting a frame
        if self.pending.is_some() && !permissive {
            return;
        }
        if position < sync_len as u64 {
            return;
        }
        let start = position - sync_len as u64;
        if start < self.horizon && !permissive {
            return;
        }
        if !self.history.contains(start, sync_len) {
            return;
        }

        let forward = self.history.distance(start, self.pattern.bits());
        let candidate = if forward <= self.threshold {
            Some((false, forward))
        } else if permissive {
            let inverted = inverted_distance(forward, sync_len);
            (inverted <= self.threshold).then_some((true, inverted))
        } else {
            None
        };

        if start < self.horizon {
            if let Some((reversed, errors)) = candidate {
                trace!(
                    bit_index = start,
                    reversed,
                    errors,
                    "ignoring syncword overlapping committed frame"
                );
                self.stats.overlapping += 1;
            }
            return;
        }

        if self.locked {
            match candidate {
                Some((reversed, errors)) if start == self.horizon => {
                    trace!(bit_index = start, errors, "cadence check passed");
                    self.accept(start, reversed, errors);
                }
                _ => {
                    debug!(bit_index = start, distance = forward, "cadence check failed; lock lost");
                    self.locked = false;
                    self.stats.lock_losses += 1;
                }
            }
            return;
        }

        if let Some((reversed, errors)) = candidate {
            self.accept(start, reversed, errors);
        }
    }

    fn accept(&mut self, start: u64, reversed: bool, errors: usize) {
        debug!(bit_index = start, reversed, errors, "syncword found");
        let pending = Pending {
            start,
            reversed,
            errors,
            burst_len: self.burst_len,
            output: self.output,
            recovery: self.recovery,
            sync: self.pattern.clone(),
        };
        self.horizon = pending.end();
        self.pending = Some(pending);
    }

    // Emit the pending frame if all of its bits have arrived.
    fn complete(&mut self) -> Option<Frame> {
        if self.history.position() < self.pending.as_ref()?.end() {
            return None;
        }
        let pending = self.pending.take()?;
        let frame = self.assemble(&pending);

        self.stats.frames += 1;
        if frame.reversed {
            self.stats.reversed += 1;
        }

        // A lock is only taken if strict was in effect for the whole frame
        match pending.recovery {
            RecoveryPolicy::Strict if self.recovery == RecoveryPolicy::Strict => {
                if !self.locked {
                    debug!(bit_index = pending.start, "locked");
                }
                self.locked = true;
            }
            RecoveryPolicy::Reset => self.history.clear(),
            _ => (),
        }

        Some(frame)
    }

    fn assemble(&self, pending: &Pending) -> Frame {
        let sync_len = pending.sync.len();
        let mut payload = Vec::with_capacity(pending.burst_len);
        match pending.output {
            OutputPolicy::Discard => (),
            OutputPolicy::Fix => payload.extend_from_slice(pending.sync.bits()),
            OutputPolicy::Keep => payload.extend(
                self.history
                    .range(pending.start, sync_len)
                    .map(|b| if pending.reversed { b ^ 0x1 } else { *b }),
            ),
        }
        payload.extend(
            self.history
                .range(pending.start + sync_len as u64, pending.burst_len - sync_len),
        );

        Frame {
            start_position: pending.start,
            frame_index: self.stats.frames,
            reversed: pending.reversed,
            errors: pending.errors,
            payload,
        }
    }
}

impl TryFrom<&DeframerConfig> for Deframer {
    type Error = crate::Error;

    fn try_from(config: &DeframerConfig) -> Result<Self> {
        Deframer::new(config)
    }
}
