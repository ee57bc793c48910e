use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;

use crate::clock::clock::{ClockHandle, PeriodicClock};
use crate::display::display::{RenderMode, StepDisplay};
use crate::error::SequencerError;
use crate::preset::preset::StepSet;
use crate::rhythm::rhythm::Tempo;
use crate::voice::voice::Voice;

/// Mutable animator state, shared between the owner and the clock task.
///
/// Ticks and `stop()` both run under this lock, so once `stop()` has returned
/// no tick can draw anything.
#[derive(Debug)]
struct AnimatorState {
    tempo: Tempo,
    steps: StepSet,
    running: bool,
    /// Bumped on every start; ticks from an older run are ignored.
    generation: u64,
    next_index: usize,
    current_index: Option<usize>,
    ticks: u64,
    display_faults: u64,
    clock: Option<ClockHandle>,
}

/// Sweeps a highlight around a fixed ring of step cells for one voice.
pub struct RingAnimator {
    voice: Voice,
    ring_length: usize,
    mode: RenderMode,
    display: Arc<dyn StepDisplay>,
    runtime: Handle,
    state: Arc<Mutex<AnimatorState>>,
}

impl RingAnimator {
    /// Create a stopped animator and draw its static markers.
    ///
    /// Must be called from within a Tokio runtime; the runtime is used later
    /// to schedule the clock.
    pub fn new(
        voice: Voice,
        ring_length: usize,
        tempo: Tempo,
        steps: StepSet,
        mode: RenderMode,
        display: Arc<dyn StepDisplay>,
    ) -> Result<Self, SequencerError> {
        if ring_length == 0 {
            return Err(SequencerError::Configuration(format!(
                "{} ring length must be at least 1",
                voice
            )));
        }
        steps.validate(ring_length)?;

        let runtime = Handle::try_current().map_err(|e| {
            SequencerError::Configuration(format!("no async runtime for {} clock: {}", voice, e))
        })?;

        display.render_static(voice, ring_length, mode, &steps)?;

        Ok(Self {
            voice,
            ring_length,
            mode,
            display,
            runtime,
            state: Arc::new(Mutex::new(AnimatorState {
                tempo,
                steps,
                running: false,
                generation: 0,
                next_index: 0,
                current_index: None,
                ticks: 0,
                display_faults: 0,
                clock: None,
            })),
        })
    }

    pub fn voice(&self) -> Voice {
        self.voice
    }

    pub fn ring_length(&self) -> usize {
        self.ring_length
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn tempo(&self) -> Tempo {
        self.state.lock().tempo
    }

    pub fn steps(&self) -> StepSet {
        self.state.lock().steps.clone()
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    /// The highlighted cell, if any.
    pub fn current_index(&self) -> Option<usize> {
        self.state.lock().current_index
    }

    /// Ticks processed since the last start.
    pub fn tick_count(&self) -> u64 {
        self.state.lock().ticks
    }

    /// Display faults swallowed by the clock since creation.
    pub fn display_faults(&self) -> u64 {
        self.state.lock().display_faults
    }

    /// Period of the running clock.
    pub fn clock_interval(&self) -> Option<Duration> {
        self.state.lock().clock.as_ref().map(ClockHandle::period)
    }

    /// Store a new tempo. A running clock keeps its period; the tempo is read
    /// again on the next start.
    pub fn set_tempo(&self, tempo: Tempo) {
        self.state.lock().tempo = tempo;
    }

    /// Replace the active steps and redraw the static markers.
    ///
    /// Leaves the cursor alone. Nothing is stored if validation or drawing
    /// fails.
    pub fn set_active_steps(&self, steps: StepSet) -> Result<(), SequencerError> {
        steps.validate(self.ring_length)?;

        let mut state = self.state.lock();
        self.display
            .render_static(self.voice, self.ring_length, self.mode, &steps)?;
        state.steps = steps;
        Ok(())
    }

    /// Start the clock from step 0. Does nothing if already running.
    pub fn start(&self) {
        let mut state = self.state.lock();
        if state.running {
            return;
        }

        state.running = true;
        state.generation += 1;
        state.next_index = 0;
        state.current_index = None;
        state.ticks = 0;

        let period = state.tempo.step_interval();
        let generation = state.generation;
        let shared = Arc::clone(&self.state);
        let display = Arc::clone(&self.display);
        let voice = self.voice;
        let ring_length = self.ring_length;

        state.clock = Some(PeriodicClock::spawn(&self.runtime, period, move || {
            Self::tick(&shared, display.as_ref(), voice, ring_length, generation);
        }));

        log::info!(
            "{} animator started at {} ({:?} per step)",
            self.voice,
            state.tempo,
            period
        );
    }

    /// Cancel the clock and clear every cursor highlight in the ring.
    ///
    /// Static markers stay. Safe to call when already stopped; the highlight
    /// is cleared either way.
    pub fn stop(&self) {
        let mut state = self.state.lock();
        let was_running = state.running;

        state.running = false;
        if let Some(mut clock) = state.clock.take() {
            clock.cancel();
        }
        state.current_index = None;

        for index in 0..self.ring_length {
            if let Err(fault) = self.display.set_cursor_highlight(self.voice, index, false) {
                state.display_faults += 1;
                log::warn!("Failed to clear highlight: {}", fault);
            }
        }

        if was_running {
            log::info!("{} animator stopped after {} ticks", self.voice, state.ticks);
        }
    }

    fn tick(
        shared: &Mutex<AnimatorState>,
        display: &dyn StepDisplay,
        voice: Voice,
        ring_length: usize,
        generation: u64,
    ) {
        let mut state = shared.lock();
        if !state.running || state.generation != generation {
            return;
        }

        let current = state.next_index;
        let previous = (current + ring_length - 1) % ring_length;

        if let Err(fault) = display.set_cursor_highlight(voice, current, true) {
            state.display_faults += 1;
            log::warn!("Tick {} on {}: {}", state.ticks + 1, voice, fault);
        }
        // On a one-cell ring the previous cell is the current one
        if previous != current {
            if let Err(fault) = display.set_cursor_highlight(voice, previous, false) {
                state.display_faults += 1;
                log::warn!("Tick {} on {}: {}", state.ticks + 1, voice, fault);
            }
        }

        state.current_index = Some(current);
        state.next_index = (current + 1) % ring_length;
        state.ticks += 1;
        log::debug!("{} step {}", voice, current);
    }
}

impl Drop for RingAnimator {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        state.running = false;
        state.clock = None;
    }
}

impl std::fmt::Debug for RingAnimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingAnimator")
            .field("voice", &self.voice)
            .field("ring_length", &self.ring_length)
            .field("mode", &self.mode)
            .field("state", &*self.state.lock())
            .finish()
    }
}
