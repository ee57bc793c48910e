//! Paints the step rows of a [`GridDisplay`] onto the terminal.

use std::io::{self, Stdout, Write};

use beatgrid_core::{Cell, GridDisplay, Marker, TransportStatus, Voice};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{Print, PrintStyledContent, Stylize};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};

const LABEL_WIDTH: usize = 12;
const DOT: &str = "\u{2022}";

/// Text of one cell, three columns wide.
pub fn cell_text(cell: &Cell) -> String {
    match cell.marker {
        Marker::Empty => "   ".to_string(),
        Marker::Dot => format!(" {} ", DOT),
        Marker::Number(n) => format!("{:>2} ", n),
    }
}

pub fn row_label(voice: Voice) -> String {
    format!("{:<width$}", voice.display_name(), width = LABEL_WIDTH)
}

pub fn status_line(status: &TransportStatus) -> String {
    format!(
        "{}  {:>6.1} BPM  preset {}/{} {}",
        if status.playback_state.is_playing() {
            "PLAYING"
        } else {
            "STOPPED"
        },
        status.tempo.bpm(),
        status.preset_index + 1,
        status.preset_count,
        status.preset_name
    )
}

/// Raw-mode alternate screen, restored on drop.
pub struct TerminalScreen {
    stdout: Stdout,
}

impl TerminalScreen {
    pub fn enter() -> io::Result<Self> {
        let mut stdout = io::stdout();
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, Hide)?;
        Ok(Self { stdout })
    }

    pub fn draw(
        &mut self,
        grid: &GridDisplay,
        status: &TransportStatus,
        message: Option<&str>,
    ) -> io::Result<()> {
        queue!(self.stdout, MoveTo(0, 0), Clear(ClearType::All))?;

        let mut line = 0u16;
        for voice in Voice::ALL {
            queue!(self.stdout, MoveTo(0, line), Print(row_label(voice)))?;
            for cell in grid.snapshot(voice) {
                let text = cell_text(&cell);
                if cell.highlighted {
                    queue!(self.stdout, PrintStyledContent(text.reverse()))?;
                } else {
                    queue!(self.stdout, Print(text))?;
                }
            }
            line += 1;
        }

        line += 1;
        queue!(self.stdout, MoveTo(0, line), Print(status_line(status)))?;
        line += 1;
        if let Some(message) = message {
            queue!(self.stdout, MoveTo(0, line), PrintStyledContent(message.yellow()))?;
        }
        line += 1;
        queue!(
            self.stdout,
            MoveTo(0, line),
            PrintStyledContent(
                "space play  s stop  [ ] tempo  1-9 preset  q quit".dark_grey()
            )
        )?;

        self.stdout.flush()
    }
}

impl Drop for TerminalScreen {
    fn drop(&mut self) {
        let _ = execute!(self.stdout, Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use beatgrid_core::{PlaybackState, Tempo};

    use super::*;

    #[test]
    fn test_cell_text() {
        let empty = Cell::default();
        assert_eq!(cell_text(&empty), "   ");

        let dot = Cell {
            marker: Marker::Dot,
            highlighted: true,
        };
        assert_eq!(cell_text(&dot), " \u{2022} ");

        let number = Cell {
            marker: Marker::Number(12),
            highlighted: false,
        };
        assert_eq!(cell_text(&number), "12 ");
    }

    #[test]
    fn test_row_label() {
        assert_eq!(row_label(Voice::OpenHat), "Open Hat    ");
        assert_eq!(row_label(Voice::Timer).trim(), "");
    }

    #[test]
    fn test_status_line() {
        let status = TransportStatus {
            playback_state: PlaybackState::Playing,
            tempo: Tempo::new(120.0).unwrap(),
            preset_index: 1,
            preset_name: "Broken Beat".to_string(),
            preset_count: 3,
        };
        assert_eq!(
            status_line(&status),
            "PLAYING   120.0 BPM  preset 2/3 Broken Beat"
        );
    }
}
