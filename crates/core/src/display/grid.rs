use parking_lot::Mutex;

use super::display::{RenderMode, StepDisplay};
use crate::error::DisplayFault;
use crate::preset::preset::StepSet;
use crate::voice::voice::Voice;

/// Static marker drawn in a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Marker {
    #[default]
    Empty,
    Dot,
    Number(usize),
}

/// State of a single step cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cell {
    pub marker: Marker,
    pub highlighted: bool,
}

#[derive(Debug, Default)]
struct GridState {
    rows: [Vec<Cell>; Voice::COUNT],
    /// Number of upcoming calls that should fail.
    pending_faults: usize,
}

/// In-memory [`StepDisplay`] holding one row of cells per voice.
///
/// Front ends paint from [`GridDisplay::snapshot`]; tests inspect it directly.
#[derive(Debug, Default)]
pub struct GridDisplay {
    state: Mutex<GridState>,
}

impl GridDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of a voice's row. Empty until the row is first rendered.
    pub fn snapshot(&self, voice: Voice) -> Vec<Cell> {
        self.state.lock().rows[voice.index()].clone()
    }

    /// Indices of highlighted cells in a row.
    pub fn highlighted(&self, voice: Voice) -> Vec<usize> {
        self.state.lock().rows[voice.index()]
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.highlighted)
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of cells carrying a dot or number.
    pub fn marked(&self, voice: Voice) -> Vec<usize> {
        self.state.lock().rows[voice.index()]
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.marker != Marker::Empty)
            .map(|(i, _)| i)
            .collect()
    }

    /// Make the next `count` display calls fail with a [`DisplayFault`].
    pub fn inject_faults(&self, count: usize) {
        self.state.lock().pending_faults = count;
    }

    fn take_fault(state: &mut GridState, voice: Voice) -> Result<(), DisplayFault> {
        if state.pending_faults > 0 {
            state.pending_faults -= 1;
            return Err(DisplayFault::new(voice, "injected fault"));
        }
        Ok(())
    }
}

impl StepDisplay for GridDisplay {
    fn render_static(
        &self,
        voice: Voice,
        ring_length: usize,
        mode: RenderMode,
        steps: &StepSet,
    ) -> Result<(), DisplayFault> {
        let mut state = self.state.lock();
        Self::take_fault(&mut state, voice)?;

        let row = &mut state.rows[voice.index()];
        row.resize(ring_length, Cell::default());
        for (i, cell) in row.iter_mut().enumerate() {
            cell.marker = match mode {
                RenderMode::Numbers => Marker::Number(i + 1),
                RenderMode::Dots if steps.contains(i) => Marker::Dot,
                RenderMode::Dots => Marker::Empty,
            };
        }
        Ok(())
    }

    fn set_cursor_highlight(
        &self,
        voice: Voice,
        index: usize,
        on: bool,
    ) -> Result<(), DisplayFault> {
        let mut state = self.state.lock();
        Self::take_fault(&mut state, voice)?;

        let row = &mut state.rows[voice.index()];
        let len = row.len();
        let cell = row.get_mut(index).ok_or_else(|| {
            DisplayFault::new(voice, format!("cell {} outside row of {}", index, len))
        })?;
        cell.highlighted = on;
        Ok(())
    }
}
