use std::thread;

use beatgrid_core::SequencerCommand;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc::UnboundedSender;

/// Tempo change per `[` / `]` press, in BPM.
pub const TEMPO_STEP_BPM: f64 = 5.0;

// Key commands
#[derive(Debug, Clone, PartialEq)]
pub enum KeyCommand {
    Sequencer(SequencerCommand),
    Quit,
}

/// Translate a key press into a command.
pub fn map_key(key: KeyEvent) -> Option<KeyCommand> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(KeyCommand::Quit),
        (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => Some(KeyCommand::Quit),
        (KeyCode::Char(' '), _) | (KeyCode::Char('p'), _) => {
            Some(KeyCommand::Sequencer(SequencerCommand::Play))
        }
        (KeyCode::Char('s'), _) => Some(KeyCommand::Sequencer(SequencerCommand::Stop)),
        (KeyCode::Char('['), _) => Some(KeyCommand::Sequencer(SequencerCommand::NudgeTempo(
            -TEMPO_STEP_BPM,
        ))),
        (KeyCode::Char(']'), _) => Some(KeyCommand::Sequencer(SequencerCommand::NudgeTempo(
            TEMPO_STEP_BPM,
        ))),
        (KeyCode::Char(c @ '1'..='9'), _) => {
            let index = c.to_digit(10)? as usize - 1;
            Some(KeyCommand::Sequencer(SequencerCommand::SelectPreset(index)))
        }
        _ => None,
    }
}

/// Read keys on a dedicated thread and forward commands until the receiver
/// goes away or the user quits.
pub fn spawn_input_thread(tx: UnboundedSender<KeyCommand>) -> thread::JoinHandle<()> {
    thread::spawn(move || loop {
        let key = match event::read() {
            Ok(Event::Key(key)) => key,
            Ok(_) => continue,
            Err(e) => {
                log::error!("Keyboard input failed: {}", e);
                let _ = tx.send(KeyCommand::Quit);
                return;
            }
        };

        if let Some(command) = map_key(key) {
            let quit = command == KeyCommand::Quit;
            if tx.send(command).is_err() || quit {
                return;
            }
        }
    })
}
