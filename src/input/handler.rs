use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::env::Action;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    EnvAction(Action),
    Restart,
    Quit,
    None,
}

pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> KeyAction {
        // Handle Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        match key.code {
            // Movement - Arrow keys. The renderer draws y = 0 at the top,
            // so screen-up is Action::Up.
            KeyCode::Up => KeyAction::EnvAction(Action::Up),
            KeyCode::Down => KeyAction::EnvAction(Action::Down),
            KeyCode::Left => KeyAction::EnvAction(Action::Left),
            KeyCode::Right => KeyAction::EnvAction(Action::Right),

            // Movement - WASD
            KeyCode::Char('w') | KeyCode::Char('W') => KeyAction::EnvAction(Action::Up),
            KeyCode::Char('s') | KeyCode::Char('S') => KeyAction::EnvAction(Action::Down),
            KeyCode::Char('a') | KeyCode::Char('A') => KeyAction::EnvAction(Action::Left),
            KeyCode::Char('d') | KeyCode::Char('D') => KeyAction::EnvAction(Action::Right),

            // Stop in place
            KeyCode::Char(' ') => KeyAction::EnvAction(Action::Stay),

            // Controls
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => KeyAction::Quit,
            KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::Restart,

            _ => KeyAction::None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_keys() {
        let handler = InputHandler::new();

        let up = KeyEvent::new(KeyCode::Up, KeyModifiers::NONE);
        assert_eq!(
            handler.handle_key_event(up),
            KeyAction::EnvAction(Action::Up)
        );

        let down = KeyEvent::new(KeyCode::Down, KeyModifiers::NONE);
        assert_eq!(
            handler.handle_key_event(down),
            KeyAction::EnvAction(Action::Down)
        );

        let left = KeyEvent::new(KeyCode::Left, KeyModifiers::NONE);
        assert_eq!(
            handler.handle_key_event(left),
            KeyAction::EnvAction(Action::Left)
        );

        let right = KeyEvent::new(KeyCode::Right, KeyModifiers::NONE);
        assert_eq!(
            handler.handle_key_event(right),
            KeyAction::EnvAction(Action::Right)
        );
    }

    #[test]
    fn test_wasd_keys() {
        let handler = InputHandler::new();

        let w = KeyEvent::new(KeyCode::Char('w'), KeyModifiers::NONE);
        assert_eq!(
            handler.handle_key_event(w),
            KeyAction::EnvAction(Action::Up)
        );

        let s = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE);
        assert_eq!(
            handler.handle_key_event(s),
            KeyAction::EnvAction(Action::Down)
        );
    }

    #[test]
    fn test_space_stops() {
        let handler = InputHandler::new();
        let space = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        assert_eq!(
            handler.handle_key_event(space),
            KeyAction::EnvAction(Action::Stay)
        );
    }

    #[test]
    fn test_quit_keys() {
        let handler = InputHandler::new();

        let q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(handler.handle_key_event(q), KeyAction::Quit);

        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(handler.handle_key_event(esc), KeyAction::Quit);

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handler.handle_key_event(ctrl_c), KeyAction::Quit);
    }

    #[test]
    fn test_restart_key() {
        let handler = InputHandler::new();
        let r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE);
        assert_eq!(handler.handle_key_event(r), KeyAction::Restart);
    }

    #[test]
    fn test_unknown_key() {
        let handler = InputHandler::new();
        let x = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(handler.handle_key_event(x), KeyAction::None);
    }
}
