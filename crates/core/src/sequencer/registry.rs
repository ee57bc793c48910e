use std::sync::Arc;

use crate::animator::ring_animator::RingAnimator;
use crate::display::display::StepDisplay;
use crate::error::SequencerError;
use crate::messages::{PlaybackState, SequencerCommand, TransportStatus};
use crate::preset::preset::StepSet;
use crate::preset::preset_library::PresetTable;
use crate::rhythm::rhythm::Tempo;
use crate::voice::voice::Voice;

/// Number of steps in every row.
pub const STEP_COUNT: usize = 16;

/// Owns one [`RingAnimator`] per voice and fans transport commands out to
/// them.
pub struct SequencerRegistry {
    presets: PresetTable,
    selected_preset: usize,
    tempo: Tempo,
    playback_state: PlaybackState,
    /// Indexed by [`Voice::index`].
    animators: Vec<RingAnimator>,
}

impl SequencerRegistry {
    /// Build every row from `presets[initial_preset]` and draw it.
    pub fn new(
        presets: PresetTable,
        initial_preset: usize,
        initial_tempo: f64,
        display: Arc<dyn StepDisplay>,
    ) -> Result<Self, SequencerError> {
        presets.validate(STEP_COUNT)?;
        let tempo = Tempo::new(initial_tempo)?;
        let pattern = presets.require(initial_preset)?;

        let animators = Voice::ALL
            .iter()
            .map(|&voice| {
                let steps = pattern.steps_for(voice).cloned().unwrap_or_default();
                RingAnimator::new(
                    voice,
                    STEP_COUNT,
                    tempo,
                    steps,
                    voice.render_mode(),
                    Arc::clone(&display),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        log::info!(
            "Sequencer registry ready: {} voices, preset '{}', {}",
            animators.len(),
            pattern.name,
            tempo
        );

        Ok(Self {
            presets,
            selected_preset: initial_preset,
            tempo,
            playback_state: PlaybackState::Stopped,
            animators,
        })
    }

    /// Start every voice, in [`Voice::ALL`] order.
    pub fn play_all(&mut self) {
        for animator in &self.animators {
            animator.start();
        }
        self.playback_state = PlaybackState::Playing;
    }

    /// Stop every voice.
    pub fn stop_all(&mut self) {
        for animator in &self.animators {
            animator.stop();
        }
        self.playback_state = PlaybackState::Stopped;
    }

    /// Store a new tempo on every voice; it takes effect on the next play.
    pub fn set_global_tempo(&mut self, bpm: f64) -> Result<(), SequencerError> {
        let tempo = Tempo::new(bpm)?;
        for animator in &self.animators {
            animator.set_tempo(tempo);
        }
        self.tempo = tempo;
        log::info!("Tempo set to {}", tempo);
        Ok(())
    }

    /// Swap every drum voice to the steps of preset `index`. The timer row
    /// is left alone.
    ///
    /// If any voice fails, the voices already swapped are put back on their
    /// previous steps and the error is returned.
    pub fn select_preset(&mut self, index: usize) -> Result<(), SequencerError> {
        let pattern = self.presets.require(index)?;

        let mut applied: Vec<(&RingAnimator, StepSet)> = Vec::new();
        for animator in &self.animators {
            let Some(steps) = pattern.steps_for(animator.voice()) else {
                continue;
            };
            let previous = animator.steps();
            if let Err(e) = animator.set_active_steps(steps.clone()) {
                log::error!("Failed to apply preset to {}: {}", animator.voice(), e);
                for (animator, previous) in applied.into_iter().rev() {
                    if let Err(restore) = animator.set_active_steps(previous) {
                        log::error!("Failed to restore {}: {}", animator.voice(), restore);
                    }
                }
                return Err(e);
            }
            applied.push((animator, previous));
        }

        log::info!("Selected preset {} '{}'", index, pattern.name);
        self.selected_preset = index;
        Ok(())
    }

    /// Apply a UI command. Tempo edits are refused while playing.
    pub fn handle_command(&mut self, command: SequencerCommand) -> Result<(), SequencerError> {
        match command {
            SequencerCommand::Play => self.play_all(),
            SequencerCommand::Stop => self.stop_all(),
            SequencerCommand::SetTempo(bpm) => {
                self.ensure_tempo_editable()?;
                self.set_global_tempo(bpm)?;
            }
            SequencerCommand::NudgeTempo(delta) => {
                self.ensure_tempo_editable()?;
                let tempo = self.tempo.nudged(delta);
                self.set_global_tempo(tempo.bpm())?;
            }
            SequencerCommand::SelectPreset(index) => self.select_preset(index)?,
        }
        Ok(())
    }

    fn ensure_tempo_editable(&self) -> Result<(), SequencerError> {
        if self.playback_state.is_playing() {
            return Err(SequencerError::TempoLocked);
        }
        Ok(())
    }

    pub fn is_playing(&self) -> bool {
        self.playback_state.is_playing()
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn selected_preset(&self) -> usize {
        self.selected_preset
    }

    pub fn presets(&self) -> &PresetTable {
        &self.presets
    }

    pub fn animator(&self, voice: Voice) -> &RingAnimator {
        &self.animators[voice.index()]
    }

    pub fn animators(&self) -> impl Iterator<Item = &RingAnimator> {
        self.animators.iter()
    }

    /// Steps currently shown for a voice.
    pub fn steps(&self, voice: Voice) -> StepSet {
        self.animator(voice).steps()
    }

    pub fn status(&self) -> TransportStatus {
        TransportStatus {
            playback_state: self.playback_state,
            tempo: self.tempo,
            preset_index: self.selected_preset,
            preset_name: self
                .presets
                .get(self.selected_preset)
                .map(|p| p.name.clone())
                .unwrap_or_default(),
            preset_count: self.presets.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use tokio::time::sleep;

    use super::*;
    use crate::display::display::RenderMode;
    use crate::display::grid::GridDisplay;
    use crate::error::DisplayFault;

    fn make_registry() -> (SequencerRegistry, Arc<GridDisplay>) {
        let grid = Arc::new(GridDisplay::new());
        let registry =
            SequencerRegistry::new(PresetTable::builtin(), 0, 120.0, grid.clone()).unwrap();
        (registry, grid)
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_rows() {
        let (registry, grid) = make_registry();

        assert_eq!(grid.marked(Voice::Kick), vec![0, 4, 8, 12]);
        assert_eq!(grid.marked(Voice::Snare), vec![4, 12]);
        assert_eq!(grid.marked(Voice::OpenHat), vec![2, 6, 10, 14]);
        assert_eq!(grid.marked(Voice::ClosedHat), vec![0, 4, 8, 12]);
        assert_eq!(grid.marked(Voice::Timer).len(), STEP_COUNT);
        assert!(!registry.is_playing());
        assert_eq!(registry.animators().count(), Voice::COUNT);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_construction() {
        let grid = Arc::new(GridDisplay::new());
        assert!(matches!(
            SequencerRegistry::new(PresetTable::builtin(), 3, 120.0, grid.clone()),
            Err(SequencerError::OutOfRange { what: "preset", .. })
        ));
        assert!(matches!(
            SequencerRegistry::new(PresetTable::builtin(), 0, 0.0, grid),
            Err(SequencerError::Configuration(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_and_stop_all() {
        let (mut registry, grid) = make_registry();
        registry.play_all();
        assert!(registry.is_playing());
        assert!(registry.animators().all(RingAnimator::is_running));

        sleep(Duration::from_millis(375)).await;
        for voice in Voice::ALL {
            assert_eq!(grid.highlighted(voice), vec![0]);
        }

        registry.stop_all();
        assert!(!registry.is_playing());
        for voice in Voice::ALL {
            assert!(grid.highlighted(voice).is_empty());
            assert!(!registry.animator(voice).is_running());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_preset() {
        let (mut registry, grid) = make_registry();
        let timer_before = grid.snapshot(Voice::Timer);

        registry.select_preset(1).unwrap();

        assert_eq!(grid.marked(Voice::Kick), vec![0, 10]);
        assert_eq!(grid.marked(Voice::Snare), vec![4, 12]);
        assert_eq!(
            grid.marked(Voice::OpenHat),
            vec![0, 2, 4, 5, 8, 9, 10, 11, 13]
        );
        assert_eq!(grid.marked(Voice::ClosedHat), vec![7, 15]);
        assert_eq!(grid.snapshot(Voice::Timer), timer_before);
        assert_eq!(registry.selected_preset(), 1);
        assert_eq!(registry.status().preset_name, "Broken Beat");
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_preset_out_of_range() {
        let (mut registry, grid) = make_registry();
        let result = registry.select_preset(7);

        assert!(matches!(
            result,
            Err(SequencerError::OutOfRange {
                what: "preset",
                index: 7,
                len: 3
            })
        ));
        assert_eq!(registry.selected_preset(), 0);
        assert_eq!(grid.marked(Voice::Kick), vec![0, 4, 8, 12]);
    }

    /// Grid that refuses one static redraw of a chosen voice.
    struct FailingRow {
        grid: GridDisplay,
        voice: Voice,
        armed: AtomicBool,
    }

    impl StepDisplay for FailingRow {
        fn render_static(
            &self,
            voice: Voice,
            ring_length: usize,
            mode: RenderMode,
            steps: &StepSet,
        ) -> Result<(), DisplayFault> {
            if voice == self.voice && self.armed.swap(false, Ordering::SeqCst) {
                return Err(DisplayFault::new(voice, "row unavailable"));
            }
            self.grid.render_static(voice, ring_length, mode, steps)
        }

        fn set_cursor_highlight(
            &self,
            voice: Voice,
            index: usize,
            on: bool,
        ) -> Result<(), DisplayFault> {
            self.grid.set_cursor_highlight(voice, index, on)
        }
    }

    fn assert_first_preset(grid: &GridDisplay) {
        assert_eq!(grid.marked(Voice::Kick), vec![0, 4, 8, 12]);
        assert_eq!(grid.marked(Voice::Snare), vec![4, 12]);
        assert_eq!(grid.marked(Voice::OpenHat), vec![2, 6, 10, 14]);
        assert_eq!(grid.marked(Voice::ClosedHat), vec![0, 4, 8, 12]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_preset_display_fault_keeps_rows() {
        let (mut registry, grid) = make_registry();

        grid.inject_faults(1);
        let result = registry.select_preset(1);

        assert!(matches!(result, Err(SequencerError::Display(_))));
        assert_eq!(registry.selected_preset(), 0);
        assert_eq!(registry.status().preset_name, "Four on the Floor");
        assert_first_preset(&grid);
        assert_eq!(registry.steps(Voice::ClosedHat), StepSet::from([0, 4, 8, 12]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_preset_rolls_back_swapped_voices() {
        let display = Arc::new(FailingRow {
            grid: GridDisplay::new(),
            voice: Voice::ClosedHat,
            armed: AtomicBool::new(false),
        });
        let mut registry =
            SequencerRegistry::new(PresetTable::builtin(), 0, 120.0, display.clone()).unwrap();

        display.armed.store(true, Ordering::SeqCst);
        let result = registry.select_preset(1);

        assert!(matches!(
            result,
            Err(SequencerError::Display(DisplayFault {
                voice: Voice::ClosedHat,
                ..
            }))
        ));
        assert_eq!(registry.selected_preset(), 0);
        assert_first_preset(&display.grid);
        let first = registry.presets().get(0).unwrap().clone();
        for voice in [Voice::Kick, Voice::Snare, Voice::OpenHat] {
            assert_eq!(Some(&registry.steps(voice)), first.steps_for(voice));
        }

        // The row recovers on the next attempt
        registry.select_preset(1).unwrap();
        assert_eq!(display.grid.marked(Voice::ClosedHat), vec![7, 15]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_global_tempo() {
        let (mut registry, _grid) = make_registry();
        registry.set_global_tempo(90.0).unwrap();

        assert_eq!(registry.tempo().bpm(), 90.0);
        for animator in registry.animators() {
            assert_eq!(animator.tempo().bpm(), 90.0);
        }
        assert!(registry.set_global_tempo(-1.0).is_err());
        assert_eq!(registry.tempo().bpm(), 90.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_lock_tempo_while_playing() {
        let (mut registry, _grid) = make_registry();

        registry.handle_command(SequencerCommand::Play).unwrap();
        assert!(matches!(
            registry.handle_command(SequencerCommand::SetTempo(100.0)),
            Err(SequencerError::TempoLocked)
        ));
        assert!(matches!(
            registry.handle_command(SequencerCommand::NudgeTempo(5.0)),
            Err(SequencerError::TempoLocked)
        ));
        assert_eq!(registry.tempo().bpm(), 120.0);

        registry.handle_command(SequencerCommand::Stop).unwrap();
        registry
            .handle_command(SequencerCommand::NudgeTempo(5.0))
            .unwrap();
        assert_eq!(registry.tempo().bpm(), 125.0);
        registry
            .handle_command(SequencerCommand::SetTempo(140.0))
            .unwrap();
        assert_eq!(registry.tempo().bpm(), 140.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_preset_change_while_playing() {
        let (mut registry, grid) = make_registry();
        registry.play_all();
        sleep(Duration::from_millis(875)).await;

        registry
            .handle_command(SequencerCommand::SelectPreset(2))
            .unwrap();
        assert_eq!(grid.marked(Voice::Kick), vec![0, 3, 7, 8, 10, 15]);
        assert_eq!(grid.highlighted(Voice::Kick), vec![2]);
        assert!(registry.is_playing());
    }
}
