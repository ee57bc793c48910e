//! The capability the sequencer engine draws through.
//!
//! Animators never touch a screen directly. They describe two kinds of change
//! to a [`StepDisplay`]:
//! - static markers: which cells carry a dot (drum rows) or a step number
//!   (the timer row)
//! - the cursor highlight that sweeps across a row while it plays
//!
//! The two are independent: clearing the cursor never removes a marker, and
//! redrawing markers never moves the cursor.

use serde::{Deserialize, Serialize};

use crate::error::DisplayFault;
use crate::preset::preset::StepSet;
use crate::voice::voice::Voice;

/// How a row's static markers are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RenderMode {
    /// A dot on every active step, nothing elsewhere.
    Dots,
    /// Cell `i` is labelled `i + 1`; active steps are ignored.
    Numbers,
}

/// Drawing surface for the step rows.
///
/// Calls may arrive from clock tasks running on any runtime worker, so
/// implementations synchronise internally.
pub trait StepDisplay: Send + Sync {
    /// Redraw all static markers of a row, replacing whatever was there.
    fn render_static(
        &self,
        voice: Voice,
        ring_length: usize,
        mode: RenderMode,
        steps: &StepSet,
    ) -> Result<(), DisplayFault>;

    /// Turn the cursor highlight of one cell on or off.
    fn set_cursor_highlight(&self, voice: Voice, index: usize, on: bool)
        -> Result<(), DisplayFault>;
}
