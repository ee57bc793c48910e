//! Beatgrid core: the step-sequencer animation engine behind the drum
//! machine.
//!
//! Each voice (timer, kick, snare, open hat, closed hat) is a
//! [`RingAnimator`] sweeping a highlight across a ring of sixteen steps on its
//! own clock. The [`SequencerRegistry`] owns one animator per voice and fans
//! play/stop/tempo/preset commands out to them. All drawing goes through the
//! [`StepDisplay`] capability, so any front end can host the engine.

pub use animator::ring_animator::RingAnimator;
pub use clock::clock::{ClockHandle, PeriodicClock};
pub use config::{ConfigError, ConfigManager, ConfigOption, ConfigSchema, Settings};
pub use display::display::{RenderMode, StepDisplay};
pub use display::grid::{Cell, GridDisplay, Marker};
pub use error::{DisplayFault, SequencerError};
pub use messages::{PlaybackState, SequencerCommand, TransportStatus};
pub use preset::preset::{PresetPattern, StepSet};
pub use preset::preset_library::PresetTable;
pub use rhythm::rhythm::{Tempo, DEFAULT_TEMPO_BPM, MAX_TEMPO_BPM, MIN_TEMPO_BPM};
pub use sequencer::registry::{SequencerRegistry, STEP_COUNT};
pub use voice::voice::Voice;

mod animator;
mod clock;
mod config;
mod display;
mod error;
pub mod messages;
mod preset;
mod rhythm;
mod sequencer;
mod voice;
