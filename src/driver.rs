//! Fixed-rate driver
//!
//! Turns wall-clock time into a whole number of simulation ticks and runs
//! simulations without a host attached.

use std::collections::BTreeMap;
use std::thread;
use std::time::{Duration, Instant};

use crate::consts::{FRAME_INTERVAL, MAX_SUBSTEPS, TICK_DT};
use crate::sim::{SimEvent, Simulation, TickInput, tick};

/// Longest frame we try to catch up on
const MAX_FRAME_TIME: Duration = Duration::from_millis(100);

/// Fixed timestep accumulator
#[derive(Debug, Clone)]
pub struct FrameClock {
    step: Duration,
    accumulator: Duration,
    max_substeps: u32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(FRAME_INTERVAL, MAX_SUBSTEPS)
    }
}

impl FrameClock {
    pub fn new(step: Duration, max_substeps: u32) -> Self {
        Self {
            step: step.max(Duration::from_millis(1)),
            accumulator: Duration::ZERO,
            max_substeps: max_substeps.max(1),
        }
    }

    #[inline]
    pub fn step(&self) -> Duration {
        self.step
    }

    /// Add `elapsed` wall time and return how many ticks are due.
    /// Long stalls are clamped so a hitch never turns into a burst.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulator += elapsed.min(MAX_FRAME_TIME);

        let mut substeps = 0;
        while self.accumulator >= self.step && substeps < self.max_substeps {
            self.accumulator -= self.step;
            substeps += 1;
        }
        substeps
    }

    /// Advance the clock and tick `sim` as many times as it says.
    /// `input` is applied to the first substep only; later substeps get the
    /// default input so one-shot commands are not repeated.
    pub fn run_frame(
        &mut self,
        sim: &mut Simulation,
        input: &TickInput,
        elapsed: Duration,
    ) -> Vec<SimEvent> {
        let mut events = Vec::new();
        let idle = TickInput {
            move_intent: input.move_intent,
            ..TickInput::default()
        };
        for i in 0..self.advance(elapsed) {
            let input = if i == 0 { input } else { &idle };
            events.extend(tick(sim, input, TICK_DT));
        }
        events
    }

    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
    }
}

/// Event counts by kind, collected over a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventTally {
    pub ticks: u64,
    pub counts: BTreeMap<&'static str, u64>,
}

impl EventTally {
    pub fn record(&mut self, events: &[SimEvent]) {
        for event in events {
            *self.counts.entry(event.kind()).or_default() += 1;
        }
    }

    pub fn count(&self, kind: &str) -> u64 {
        self.counts.get(kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }
}

/// Run `sim` for `ticks` ticks with default input.
///
/// With `realtime` the loop is paced by a [`FrameClock`] at the nominal frame
/// interval; otherwise it runs as fast as possible.
pub fn run_headless(sim: &mut Simulation, ticks: u64, realtime: bool) -> EventTally {
    let mut tally = EventTally::default();
    let input = TickInput::default();

    if !realtime {
        for _ in 0..ticks {
            tally.record(&tick(sim, &input, TICK_DT));
            tally.ticks += 1;
        }
        return tally;
    }

    let mut clock = FrameClock::default();
    let mut last = Instant::now();
    while tally.ticks < ticks {
        let now = Instant::now();
        let due = clock.advance(now - last);
        last = now;

        for _ in 0..due {
            if tally.ticks >= ticks {
                break;
            }
            tally.record(&tick(sim, &input, TICK_DT));
            tally.ticks += 1;
        }

        let spent = Instant::now() - now;
        if let Some(rest) = clock.step().checked_sub(spent) {
            thread::sleep(rest);
        }
    }
    log::debug!("realtime run finished after {} ticks", tally.ticks);
    tally
}
