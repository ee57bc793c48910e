use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::display::display::RenderMode;

/// One row of the drum machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Voice {
    Timer,
    Kick,
    Snare,
    OpenHat,
    ClosedHat,
}

impl Voice {
    pub const COUNT: usize = 5;

    /// Every voice, in the order rows are built and commands fan out.
    pub const ALL: [Voice; Self::COUNT] = [
        Voice::Timer,
        Voice::Kick,
        Voice::Snare,
        Voice::OpenHat,
        Voice::ClosedHat,
    ];

    /// Get the voice as a numeric index into [`Voice::ALL`].
    pub fn index(&self) -> usize {
        match self {
            Self::Timer => 0,
            Self::Kick => 1,
            Self::Snare => 2,
            Self::OpenHat => 3,
            Self::ClosedHat => 4,
        }
    }

    /// Get the voice from a numeric index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Machine name, as used in preset files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timer => "timer",
            Self::Kick => "kick",
            Self::Snare => "snare",
            Self::OpenHat => "open-hat",
            Self::ClosedHat => "closed-hat",
        }
    }

    /// Row label. The timer row has none.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Timer => "",
            Self::Kick => "Kick",
            Self::Snare => "Snare",
            Self::OpenHat => "Open Hat",
            Self::ClosedHat => "Closed Hat",
        }
    }

    pub fn is_timer(&self) -> bool {
        matches!(self, Self::Timer)
    }

    /// The timer row shows step numbers; every drum row shows dots.
    pub fn render_mode(&self) -> RenderMode {
        if self.is_timer() {
            RenderMode::Numbers
        } else {
            RenderMode::Dots
        }
    }
}

impl std::fmt::Display for Voice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Voice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|voice| voice.as_str() == s)
            .ok_or_else(|| format!("unknown voice '{}'", s))
    }
}
