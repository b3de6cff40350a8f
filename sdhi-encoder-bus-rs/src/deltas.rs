//! Quadrature decoding and the shared per-encoder delta accumulators.
//!
//! The poller and the consumer run in different execution contexts:
//!
//! - [`EncoderPoller`] is owned by the real-time loop. It samples the bus,
//!   decodes edges locally and only then takes the lock to add the counts.
//! - [`EncoderDeltas`] lives in a `static` and is drained by the main loop.
//!
//! The lock guards the accumulator array only and is never held across
//! bus I/O.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::bus::{QuadraturePins, QuadratureSampler};

/// Signed tick counts accumulated since the last [`drain`](Self::drain).
pub struct EncoderDeltas<const N: usize> {
    counts: Mutex<CriticalSectionRawMutex, RefCell<[i32; N]>>,
}

impl<const N: usize> Default for EncoderDeltas<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> EncoderDeltas<N> {
    /// Create zeroed accumulators. `const` so the array can be a `static`.
    pub const fn new() -> Self {
        Self {
            counts: Mutex::new(RefCell::new([0; N])),
        }
    }

    /// Add decoded steps to the accumulators.
    pub fn accumulate(&self, steps: &[i32; N]) {
        self.counts.lock(|counts| {
            let mut counts = counts.borrow_mut();
            for (count, step) in counts.iter_mut().zip(steps) {
                *count = count.saturating_add(*step);
            }
        });
    }

    /// Copy and zero all accumulators in one critical section.
    ///
    /// Returns `None` when no encoder moved since the previous drain.
    ///
    /// # Examples
    ///
    /// ```
    /// use encoder_bus::EncoderDeltas;
    ///
    /// let deltas: EncoderDeltas<2> = EncoderDeltas::new();
    /// assert_eq!(deltas.drain(), None);
    ///
    /// deltas.accumulate(&[0, -1]);
    /// assert_eq!(deltas.drain(), Some([0, -1]));
    /// assert_eq!(deltas.drain(), None);
    /// ```
    pub fn drain(&self) -> Option<[i32; N]> {
        let drained = self
            .counts
            .lock(|counts| core::mem::replace(&mut *counts.borrow_mut(), [0; N]));

        drained.iter().any(|&count| count != 0).then_some(drained)
    }
}

/// Edge detector feeding [`EncoderDeltas`] from a [`QuadratureSampler`].
///
/// Decoding is single-edge: only a rising edge of channel A produces a count,
/// and channel B at that instant gives the direction.
pub struct EncoderPoller<'a, S, const N: usize> {
    sampler: S,
    deltas: &'a EncoderDeltas<N>,
    /// Channel A level at the previous sample. Starts high so that an
    /// encoder resting with A high does not count at power-on.
    previous_a: [bool; N],
}

impl<'a, S, const N: usize> EncoderPoller<'a, S, N>
where
    S: QuadratureSampler<N>,
{
    pub fn new(sampler: S, deltas: &'a EncoderDeltas<N>) -> Self {
        Self {
            sampler,
            deltas,
            previous_a: [true; N],
        }
    }

    /// Sample the bus once and accumulate any decoded steps.
    ///
    /// Returns `Ok(true)` if at least one encoder moved.
    ///
    /// # Errors
    /// Propagates the sampler's bus error. Decoder state is left untouched,
    /// so a failed sample costs at most the transitions it missed.
    pub async fn poll(&mut self) -> Result<bool, S::Error> {
        let pins = self.sampler.sample().await?;
        let steps = self.decode(&pins);

        let moved = steps.iter().any(|&step| step != 0);
        if moved {
            self.deltas.accumulate(&steps);
        }
        Ok(moved)
    }

    fn decode(&mut self, pins: &[QuadraturePins; N]) -> [i32; N] {
        core::array::from_fn(|i| {
            let rising = pins[i].a && !self.previous_a[i];
            self.previous_a[i] = pins[i].a;
            match (rising, pins[i].b) {
                (false, _) => 0,
                (true, false) => 1,
                (true, true) => -1,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;

    const LOW: QuadraturePins = QuadraturePins { a: false, b: false };
    const CW: QuadraturePins = QuadraturePins { a: true, b: false };
    const CCW: QuadraturePins = QuadraturePins { a: true, b: true };

    /// Replays a fixed script of samples, then fails.
    struct Script<const N: usize> {
        samples: [[QuadraturePins; N]; 6],
        next: usize,
    }

    impl<const N: usize> QuadratureSampler<N> for Script<N> {
        type Error = ();

        async fn sample(&mut self) -> Result<[QuadraturePins; N], ()> {
            let sample = self.samples.get(self.next).copied().ok_or(())?;
            self.next += 1;
            Ok(sample)
        }
    }

    fn poll_all<const N: usize>(poller: &mut EncoderPoller<'_, Script<N>, N>, times: usize) {
        for _ in 0..times {
            block_on(poller.poll()).unwrap();
        }
    }

    // ── EncoderDeltas ────────────────────────────────────────────────

    #[test]
    fn drain_returns_none_when_idle() {
        let deltas: EncoderDeltas<3> = EncoderDeltas::new();
        assert_eq!(deltas.drain(), None);
    }

    #[test]
    fn drain_zeroes_accumulators() {
        let deltas: EncoderDeltas<3> = EncoderDeltas::new();
        deltas.accumulate(&[1, 0, -2]);
        deltas.accumulate(&[1, 0, 0]);

        assert_eq!(deltas.drain(), Some([2, 0, -2]));
        assert_eq!(deltas.drain(), None);
    }

    #[test]
    fn accumulate_saturates() {
        let deltas: EncoderDeltas<1> = EncoderDeltas::new();
        deltas.accumulate(&[i32::MAX]);
        deltas.accumulate(&[1]);
        assert_eq!(deltas.drain(), Some([i32::MAX]));
    }

    // ── Decoding ─────────────────────────────────────────────────────

    #[test]
    fn resting_high_at_power_on_is_not_an_edge() {
        let deltas: EncoderDeltas<1> = EncoderDeltas::new();
        let script = Script { samples: [[CW]; 6], next: 0 };
        let mut poller = EncoderPoller::new(script, &deltas);

        poll_all(&mut poller, 6);
        assert_eq!(deltas.drain(), None);
    }

    #[test]
    fn rising_edge_with_b_low_counts_up() {
        let deltas: EncoderDeltas<1> = EncoderDeltas::new();
        let script = Script {
            samples: [[LOW], [CW], [LOW], [CW], [CW], [LOW]],
            next: 0,
        };
        let mut poller = EncoderPoller::new(script, &deltas);

        poll_all(&mut poller, 6);
        assert_eq!(deltas.drain(), Some([2]));
    }

    #[test]
    fn rising_edge_with_b_high_counts_down() {
        let deltas: EncoderDeltas<1> = EncoderDeltas::new();
        let script = Script {
            samples: [[LOW], [CCW], [LOW], [CCW], [LOW], [CW]],
            next: 0,
        };
        let mut poller = EncoderPoller::new(script, &deltas);

        poll_all(&mut poller, 6);
        // Two counter-clockwise edges, one clockwise.
        assert_eq!(deltas.drain(), Some([-1]));
    }

    #[test]
    fn encoders_decode_independently() {
        let deltas: EncoderDeltas<2> = EncoderDeltas::new();
        let script = Script {
            samples: [
                [LOW, LOW],
                [CW, LOW],
                [CW, CCW],
                [LOW, CCW],
                [LOW, LOW],
                [LOW, CCW],
            ],
            next: 0,
        };
        let mut poller = EncoderPoller::new(script, &deltas);

        poll_all(&mut poller, 6);
        assert_eq!(deltas.drain(), Some([1, -2]));
    }

    #[test]
    fn poll_reports_movement() {
        let deltas: EncoderDeltas<1> = EncoderDeltas::new();
        let script = Script {
            samples: [[LOW], [CW], [CW], [LOW], [LOW], [LOW]],
            next: 0,
        };
        let mut poller = EncoderPoller::new(script, &deltas);

        assert_eq!(block_on(poller.poll()), Ok(false));
        assert_eq!(block_on(poller.poll()), Ok(true));
        assert_eq!(block_on(poller.poll()), Ok(false));
    }

    #[test]
    fn failed_sample_keeps_decoder_state() {
        let deltas: EncoderDeltas<1> = EncoderDeltas::new();
        let script = Script {
            samples: [[LOW], [CW], [LOW], [LOW], [LOW], [LOW]],
            next: 0,
        };
        let mut poller = EncoderPoller::new(script, &deltas);

        poll_all(&mut poller, 6);
        assert_eq!(block_on(poller.poll()), Err(()));
        assert_eq!(deltas.drain(), Some([1]));
    }
}
