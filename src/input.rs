//! Keyboard input: terminal keys to game actions

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Everything the game responds to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Left,
    Right,
    Confirm,
    Quit,
}

impl Action {
    pub const COUNT: usize = 4;
    pub const ALL: [Action; Action::COUNT] =
        [Action::Left, Action::Right, Action::Confirm, Action::Quit];

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// `repeat` is set for auto-repeat of a key that is already down
    KeyDown { action: Action, repeat: bool },
    KeyUp(Action),
    /// Window/terminal level quit request
    Quit,
}

/// Which actions are currently held
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Keys {
    held: [bool; Action::COUNT],
}

impl Keys {
    pub fn press(&mut self, action: Action) {
        self.held[action.index()] = true;
    }

    pub fn release(&mut self, action: Action) {
        self.held[action.index()] = false;
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.held[action.index()]
    }
}

pub fn map_key(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Char('a' | 'A') | KeyCode::Left => Some(Action::Left),
        KeyCode::Char('d' | 'D') | KeyCode::Right => Some(Action::Right),
        KeyCode::Char(' ') => Some(Action::Confirm),
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Some(Action::Quit),
        _ => None,
    }
}

/// Translate a crossterm key event. Unmapped keys yield `None`.
pub fn translate(key: KeyEvent) -> Option<InputEvent> {
    // Raw mode swallows SIGINT, so Ctrl-C arrives as a key
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(InputEvent::Quit);
    }
    let action = map_key(key.code)?;
    Some(match key.kind {
        KeyEventKind::Press => InputEvent::KeyDown {
            action,
            repeat: false,
        },
        KeyEventKind::Repeat => InputEvent::KeyDown {
            action,
            repeat: true,
        },
        KeyEventKind::Release => InputEvent::KeyUp(action),
    })
}

/// Fakes key releases for terminals that only report presses.
///
/// Every press keeps the action held for `hold_ticks` ticks. Terminal
/// auto-repeat shows up as more presses, so a press arriving less than
/// `repeat_window` ticks after the previous one is reported as a repeat.
/// Anything slower is a fresh press, even if the hold hasn't expired.
#[derive(Debug, Clone)]
pub struct KeyLatch {
    hold_ticks: u32,
    repeat_window: u32,
    remaining: [u32; Action::COUNT],
    since_press: [u32; Action::COUNT],
}

impl KeyLatch {
    pub fn new(hold_ticks: u32, repeat_window: u32) -> Self {
        Self {
            hold_ticks,
            repeat_window,
            remaining: [0; Action::COUNT],
            since_press: [u32::MAX; Action::COUNT],
        }
    }

    pub fn observe(&mut self, event: InputEvent) -> InputEvent {
        match event {
            InputEvent::KeyDown { action, repeat } => {
                let i = action.index();
                let repeat = repeat || self.since_press[i] < self.repeat_window;
                self.since_press[i] = 0;
                self.remaining[i] = self.hold_ticks;
                InputEvent::KeyDown { action, repeat }
            }
            InputEvent::KeyUp(action) => {
                self.remaining[action.index()] = 0;
                event
            }
            InputEvent::Quit => event,
        }
    }

    /// Advance one tick, returning releases for holds that just expired.
    pub fn tick(&mut self) -> Vec<InputEvent> {
        let mut released = Vec::new();
        for action in Action::ALL {
            let i = action.index();
            self.since_press[i] = self.since_press[i].saturating_add(1);
            if self.remaining[i] > 0 {
                self.remaining[i] -= 1;
                if self.remaining[i] == 0 {
                    released.push(InputEvent::KeyUp(action));
                }
            }
        }
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_keys_table() {
        let mut keys = Keys::default();
        assert!(!keys.is_held(Action::Left));
        keys.press(Action::Left);
        keys.press(Action::Confirm);
        assert!(keys.is_held(Action::Left));
        assert!(keys.is_held(Action::Confirm));
        assert!(!keys.is_held(Action::Right));
        keys.release(Action::Left);
        assert!(!keys.is_held(Action::Left));
        assert!(keys.is_held(Action::Confirm));
    }

    #[test]
    fn test_translate_kinds() {
        assert_eq!(
            translate(key(KeyCode::Char('d'), KeyEventKind::Press)),
            Some(InputEvent::KeyDown {
                action: Action::Right,
                repeat: false
            })
        );
        assert_eq!(
            translate(key(KeyCode::Left, KeyEventKind::Repeat)),
            Some(InputEvent::KeyDown {
                action: Action::Left,
                repeat: true
            })
        );
        assert_eq!(
            translate(key(KeyCode::Char(' '), KeyEventKind::Release)),
            Some(InputEvent::KeyUp(Action::Confirm))
        );
        assert_eq!(translate(key(KeyCode::Char('x'), KeyEventKind::Press)), None);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut ev = key(KeyCode::Char('c'), KeyEventKind::Press);
        ev.modifiers = KeyModifiers::CONTROL;
        assert_eq!(translate(ev), Some(InputEvent::Quit));
    }

    #[test]
    fn test_latch_releases_after_hold() {
        let mut latch = KeyLatch::new(3, 2);
        let down = InputEvent::KeyDown {
            action: Action::Left,
            repeat: false,
        };
        assert_eq!(latch.observe(down), down);

        assert!(latch.tick().is_empty());
        assert!(latch.tick().is_empty());
        assert_eq!(latch.tick(), vec![InputEvent::KeyUp(Action::Left)]);
        assert!(latch.tick().is_empty());
    }

    #[test]
    fn test_latch_turns_rapid_presses_into_repeats() {
        let mut latch = KeyLatch::new(5, 3);
        let down = InputEvent::KeyDown {
            action: Action::Confirm,
            repeat: false,
        };
        let repeat = InputEvent::KeyDown {
            action: Action::Confirm,
            repeat: true,
        };
        latch.observe(down);
        latch.tick();
        latch.tick();
        assert_eq!(latch.observe(down), repeat);

        // Hold restarted by the repeat
        for _ in 0..4 {
            assert!(latch.tick().is_empty());
        }
        assert_eq!(latch.tick(), vec![InputEvent::KeyUp(Action::Confirm)]);
        assert_eq!(latch.observe(down), down);
    }

    #[test]
    fn test_latch_slow_press_is_fresh_while_still_held() {
        let mut latch = KeyLatch::new(30, 3);
        let down = InputEvent::KeyDown {
            action: Action::Confirm,
            repeat: false,
        };
        latch.observe(down);
        for _ in 0..3 {
            assert!(latch.tick().is_empty());
        }
        // Still latched, but too slow to be auto-repeat
        assert_eq!(latch.observe(down), down);
    }

    #[test]
    fn test_latch_keys_are_independent() {
        let mut latch = KeyLatch::new(30, 3);
        latch.observe(InputEvent::KeyDown {
            action: Action::Left,
            repeat: false,
        });
        let confirm = InputEvent::KeyDown {
            action: Action::Confirm,
            repeat: false,
        };
        assert_eq!(latch.observe(confirm), confirm);
    }
}
