//! Keyboard input: action table, raw-mode guard, and the listener thread.
//!
//! The listener runs on its own thread, owns raw-mode terminal access for
//! its lifetime, and forwards named actions to the engine over a bounded
//! single-slot channel drained once per render tick. It never blocks on the
//! engine and never crashes the process: per-iteration faults are swallowed
//! and looping continues.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, is_raw_mode_enabled};

/// How long each listener iteration waits for input.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Directional input from arrow keys, reserved for panel navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Named engine actions triggered by keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    RefreshNow,
    ToggleHelp,
    TogglePause,
    CycleTheme,
    /// Shorten the refresh interval by 1s (floor 1).
    FasterRefresh,
    /// Lengthen the refresh interval by 1s (ceiling 60).
    SlowerRefresh,
    RequestExport,
    ClearRedraw,
    /// Reserved for future panel navigation; no default engine binding.
    Navigate(Direction),
}

/// Map a key event to its bound action, if any.
///
/// Unbound input maps to `None` and is ignored without error.
pub fn action_for(key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(Action::Quit),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Action::RefreshNow),
        KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Char('H') => Some(Action::ToggleHelp),
        KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Char(' ') => Some(Action::TogglePause),
        KeyCode::Char('t') | KeyCode::Char('T') => Some(Action::CycleTheme),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::FasterRefresh),
        KeyCode::Char('-') | KeyCode::Char('_') => Some(Action::SlowerRefresh),
        KeyCode::Char('e') | KeyCode::Char('E') => Some(Action::RequestExport),
        KeyCode::Char('c') | KeyCode::Char('C') => Some(Action::ClearRedraw),
        KeyCode::Up => Some(Action::Navigate(Direction::Up)),
        KeyCode::Down => Some(Action::Navigate(Direction::Down)),
        KeyCode::Left => Some(Action::Navigate(Direction::Left)),
        KeyCode::Right => Some(Action::Navigate(Direction::Right)),
        _ => None,
    }
}

/// Scoped raw-mode acquisition.
///
/// Enables raw mode on creation and restores the prior mode on drop, on
/// every exit path including panics and forced termination of the thread's
/// scope. If the terminal was already raw, drop leaves it that way.
#[derive(Debug)]
pub struct RawModeGuard {
    enabled_here: bool,
}

impl RawModeGuard {
    /// Enter raw mode. Fails when the terminal does not support it
    /// (e.g. non-interactive environments).
    pub fn acquire() -> std::io::Result<Self> {
        let was_raw = is_raw_mode_enabled()?;
        if !was_raw {
            enable_raw_mode()?;
        }
        Ok(Self {
            enabled_here: !was_raw,
        })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if self.enabled_here {
            let _ = disable_raw_mode();
        }
    }
}

/// Handle to the background keyboard listener.
#[derive(Debug)]
pub struct KeyboardListener {
    stop: Arc<AtomicBool>,
    actions: Receiver<Action>,
    handle: Option<JoinHandle<()>>,
}

impl KeyboardListener {
    /// Start the listener thread.
    ///
    /// If raw mode cannot be entered, the thread logs the degradation and
    /// exits; the dashboard keeps refreshing without keyboard interactivity.
    pub fn spawn() -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let (tx, rx) = sync_channel(1);
        let thread_stop = Arc::clone(&stop);
        let handle = std::thread::spawn(move || listen_loop(&thread_stop, &tx));
        Self {
            stop,
            actions: rx,
            handle: Some(handle),
        }
    }

    /// Take the next pending action without blocking.
    pub fn try_next(&self) -> Option<Action> {
        self.actions.try_recv().ok()
    }

    /// Signal the listener to stop and wait for it to exit.
    ///
    /// The listener observes the flag within one poll interval.
    pub fn stop(mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for KeyboardListener {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn listen_loop(stop: &AtomicBool, tx: &SyncSender<Action>) {
    let _guard = match RawModeGuard::acquire() {
        Ok(guard) => guard,
        Err(err) => {
            tracing::warn!(error = %err, "raw mode unavailable, keyboard input disabled");
            return;
        }
    };

    while !stop.load(Ordering::Relaxed) {
        match event::poll(POLL_INTERVAL) {
            Ok(true) => {
                let Ok(event) = event::read() else {
                    continue;
                };
                if let Event::Key(key) = event {
                    if let Some(action) = action_for(key) {
                        // Single-slot channel: drop the keystroke when the
                        // engine has not drained the previous one yet
                        let _ = tx.try_send(action);
                    }
                }
            }
            Ok(false) => {}
            // Poll faults are swallowed; the loop continues
            Err(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_action_table() {
        let table = [
            (KeyCode::Char('q'), Action::Quit),
            (KeyCode::Char('Q'), Action::Quit),
            (KeyCode::Char('r'), Action::RefreshNow),
            (KeyCode::Char('?'), Action::ToggleHelp),
            (KeyCode::Char('h'), Action::ToggleHelp),
            (KeyCode::Char('p'), Action::TogglePause),
            (KeyCode::Char(' '), Action::TogglePause),
            (KeyCode::Char('t'), Action::CycleTheme),
            (KeyCode::Char('+'), Action::FasterRefresh),
            (KeyCode::Char('='), Action::FasterRefresh),
            (KeyCode::Char('-'), Action::SlowerRefresh),
            (KeyCode::Char('_'), Action::SlowerRefresh),
            (KeyCode::Char('e'), Action::RequestExport),
            (KeyCode::Char('c'), Action::ClearRedraw),
        ];
        for (code, expected) in table {
            assert_eq!(action_for(press(code)), Some(expected), "key {:?}", code);
        }
    }

    #[test]
    fn test_arrows_map_to_navigation() {
        assert_eq!(
            action_for(press(KeyCode::Up)),
            Some(Action::Navigate(Direction::Up))
        );
        assert_eq!(
            action_for(press(KeyCode::Right)),
            Some(Action::Navigate(Direction::Right))
        );
    }

    #[test]
    fn test_unbound_input_ignored() {
        assert_eq!(action_for(press(KeyCode::Char('z'))), None);
        assert_eq!(action_for(press(KeyCode::F(5))), None);
        assert_eq!(action_for(press(KeyCode::Enter)), None);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(action_for(key), Some(Action::Quit));
        // Plain 'c' stays clear-and-redraw
        assert_eq!(action_for(press(KeyCode::Char('c'))), Some(Action::ClearRedraw));
    }

    #[test]
    fn test_release_events_ignored() {
        let mut key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert_eq!(action_for(key), None);
    }
}
