//! # Keyboard tuning input
//!
//! Lets the operator adjust the throttle speed and gains while the vehicle is running. Keys are
//! read on a dedicated thread with the terminal in raw mode:
//!
//! | Key                     | Action          |
//! |-------------------------|-----------------|
//! | Up / Down               | Throttle speed  |
//! | Ctrl+A / Ctrl+S         | kp up / down    |
//! | Ctrl+D / Ctrl+H, Bksp   | kd up / down    |
//! | Esc                     | Stop tuning     |
//! | Ctrl+C                  | Stop the exec   |
//!
//! Every change is logged and saved to `tuning/tuning.json` in the session directory.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    sync::{Arc, atomic::{AtomicBool, Ordering}},
    thread::{self, JoinHandle},
    time::Duration
};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode}
};
use log::{info, warn};

use crate::tuning::{SharedTuning, TuningCommand, TuningIncrements, TuningParameters};
use util::session;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Pause after each handled key.
const KEY_HANDLED_SLEEP: Duration = Duration::from_millis(100);

/// Session relative path the tuning values are saved to.
const TUNING_SAVE_PATH: &str = "tuning/tuning.json";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Handle to the keyboard input thread.
///
/// Dropping the handle restores the terminal, so the exec never leaves it in raw mode.
pub struct KeyInput {
    join_handle: Option<JoinHandle<()>>,

    quit: Arc<AtomicBool>
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Action bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Adjust the tuning values
    Tune(TuningCommand),

    /// Stop reading keys, the exec keeps running
    Exit,

    /// Stop reading keys and ask the exec to shut down
    Quit,
}

#[derive(Debug, thiserror::Error)]
pub enum KeyInputError {
    #[error("Could not put the terminal into raw mode: {0}")]
    RawModeError(std::io::Error),

    #[error("Could not spawn the key input thread: {0}")]
    SpawnError(std::io::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl KeyInput {
    /// Put the terminal in raw mode and start reading keys.
    pub fn start(tuning: SharedTuning, inc: TuningIncrements) -> Result<Self, KeyInputError> {
        enable_raw_mode().map_err(KeyInputError::RawModeError)?;

        let quit = Arc::new(AtomicBool::new(false));
        let quit_clone = quit.clone();

        let join_handle = thread::Builder::new()
            .name("key_input".into())
            .spawn(move || key_input_thread(tuning, inc, quit_clone))
            .map_err(|e| {
                restore_terminal();
                KeyInputError::SpawnError(e)
            })?;

        Ok(Self {
            join_handle: Some(join_handle),
            quit
        })
    }

    /// True once the operator has asked the exec to shut down.
    pub fn quit_requested(&self) -> bool {
        self.quit.load(Ordering::Relaxed)
    }
}

impl Drop for KeyInput {
    fn drop(&mut self) {
        restore_terminal();

        // The thread is blocked reading the terminal, so it is detached rather than joined
        self.join_handle.take();
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Map a key event to its action, if it has one.
pub fn key_to_action(key: &KeyEvent) -> Option<KeyAction> {
    if key.kind != KeyEventKind::Press {
        return None
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    let action = match key.code {
        KeyCode::Up => KeyAction::Tune(TuningCommand::SpeedUp),
        KeyCode::Down => KeyAction::Tune(TuningCommand::SpeedDown),
        KeyCode::Esc => KeyAction::Exit,

        // Terminals send Ctrl+H as a backspace
        KeyCode::Backspace => KeyAction::Tune(TuningCommand::KdDown),

        KeyCode::Char(c) if ctrl => match c.to_ascii_lowercase() {
            'a' => KeyAction::Tune(TuningCommand::KpUp),
            's' => KeyAction::Tune(TuningCommand::KpDown),
            'd' => KeyAction::Tune(TuningCommand::KdUp),
            'h' => KeyAction::Tune(TuningCommand::KdDown),
            'c' => KeyAction::Quit,
            _ => return None
        },

        _ => return None
    };

    Some(action)
}

fn key_input_thread(tuning: SharedTuning, inc: TuningIncrements, quit: Arc<AtomicBool>) {
    info!("Keyboard tuning active: Up/Down speed, Ctrl+A/S kp, Ctrl+D/H kd, Esc to stop");

    loop {
        let key = match event::read() {
            Ok(Event::Key(k)) => k,
            Ok(_) => continue,
            Err(e) => {
                warn!("Error reading key press: {}", e);
                continue;
            }
        };

        match key_to_action(&key) {
            Some(KeyAction::Tune(cmd)) => {
                let params = tuning.apply(cmd, &inc);
                log_change(cmd, &params);
                session::save(TUNING_SAVE_PATH, params);

                thread::sleep(KEY_HANDLED_SLEEP);
            },
            Some(KeyAction::Exit) => {
                info!("Keyboard tuning stopped");
                break
            },
            Some(KeyAction::Quit) => {
                info!("Shutdown requested from the keyboard");
                quit.store(true, Ordering::Relaxed);
                break
            },
            None => ()
        }
    }

    restore_terminal();
}

fn log_change(cmd: TuningCommand, params: &TuningParameters) {
    match cmd {
        TuningCommand::SpeedUp | TuningCommand::SpeedDown =>
            info!("Throttle speed set to {:.2}", params.throttle_speed),
        TuningCommand::KpUp | TuningCommand::KpDown =>
            info!("kp set to {:.5}", params.kp),
        TuningCommand::KdUp | TuningCommand::KdDown =>
            info!("kd set to {:.4}", params.kd),
    }
}

fn restore_terminal() {
    if let Err(e) = disable_raw_mode() {
        warn!("Could not restore the terminal: {}", e);
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_key_map() {
        let none = KeyModifiers::NONE;
        let ctrl = KeyModifiers::CONTROL;

        let cases = [
            (press(KeyCode::Up, none), Some(KeyAction::Tune(TuningCommand::SpeedUp))),
            (press(KeyCode::Down, none), Some(KeyAction::Tune(TuningCommand::SpeedDown))),
            (press(KeyCode::Char('a'), ctrl), Some(KeyAction::Tune(TuningCommand::KpUp))),
            (press(KeyCode::Char('s'), ctrl), Some(KeyAction::Tune(TuningCommand::KpDown))),
            (press(KeyCode::Char('d'), ctrl), Some(KeyAction::Tune(TuningCommand::KdUp))),
            (press(KeyCode::Char('h'), ctrl), Some(KeyAction::Tune(TuningCommand::KdDown))),
            (press(KeyCode::Backspace, none), Some(KeyAction::Tune(TuningCommand::KdDown))),
            (press(KeyCode::Esc, none), Some(KeyAction::Exit)),
            (press(KeyCode::Char('c'), ctrl), Some(KeyAction::Quit)),
        ];

        for (key, action) in cases.iter() {
            assert_eq!(key_to_action(key), *action, "{:?}", key);
        }
    }

    #[test]
    fn test_unbound_keys() {
        // Plain letters do nothing without Ctrl
        assert_eq!(key_to_action(&press(KeyCode::Char('a'), KeyModifiers::NONE)), None);
        assert_eq!(key_to_action(&press(KeyCode::Char('x'), KeyModifiers::CONTROL)), None);
        assert_eq!(key_to_action(&press(KeyCode::Left, KeyModifiers::NONE)), None);
    }

    #[test]
    fn test_release_ignored() {
        let release = KeyEvent::new_with_kind(
            KeyCode::Up,
            KeyModifiers::NONE,
            KeyEventKind::Release
        );

        assert_eq!(key_to_action(&release), None);
    }
}
