use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum InputEvent {
    Key { key: KeyCode, mods: KeyModifiers },
    PointerMoved { col: u16, row: u16 },
    Click { col: u16, row: u16 },
    Resize { cols: u16, rows: u16 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Quit,
    TogglePause,
    FlipTheme,
    ScaleDown,
    ScaleUp,
    SpeedDown,
    SpeedUp,
    InfoToggle,
    HudToggle,
}

pub(crate) fn collect_input_nonblocking(max_frame_time: Duration) -> anyhow::Result<Vec<InputEvent>> {
    let mut out = Vec::new();

    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        match event::read()? {
            Event::Key(k) if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat => {
                out.push(InputEvent::Key {
                    key: k.code,
                    mods: k.modifiers,
                });
            }
            Event::Mouse(m) => match m.kind {
                MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                    out.push(InputEvent::PointerMoved {
                        col: m.column,
                        row: m.row,
                    });
                }
                MouseEventKind::Down(MouseButton::Left) => {
                    out.push(InputEvent::Click {
                        col: m.column,
                        row: m.row,
                    });
                }
                _ => {}
            },
            Event::Resize(cols, rows) => out.push(InputEvent::Resize { cols, rows }),
            _ => {}
        }
        if out.len() >= 64 {
            break;
        }
    }
    Ok(out)
}

pub(crate) fn map_key(key: KeyCode, mods: KeyModifiers) -> Option<Action> {
    match key {
        // Shift+P arrives as an upper-case char on most terminals, with or
        // without the SHIFT modifier bit.
        KeyCode::Char('P') => Some(Action::TogglePause),
        KeyCode::Char('p') if mods.contains(KeyModifiers::SHIFT) => Some(Action::TogglePause),
        KeyCode::Char('c') if mods.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char('t') | KeyCode::Char('T') => Some(Action::FlipTheme),
        KeyCode::Char('[') => Some(Action::ScaleDown),
        KeyCode::Char(']') => Some(Action::ScaleUp),
        KeyCode::Char('-') | KeyCode::Char('_') => Some(Action::SpeedDown),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::SpeedUp),
        KeyCode::Char('i') | KeyCode::Char('I') => Some(Action::InfoToggle),
        KeyCode::Char('h') | KeyCode::Char('H') => Some(Action::HudToggle),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_p_toggles() {
        assert_eq!(
            map_key(KeyCode::Char('P'), KeyModifiers::SHIFT),
            Some(Action::TogglePause)
        );
        assert_eq!(
            map_key(KeyCode::Char('P'), KeyModifiers::NONE),
            Some(Action::TogglePause)
        );
        assert_eq!(map_key(KeyCode::Char('p'), KeyModifiers::NONE), None);
    }

    #[test]
    fn ctrl_c_quits() {
        assert_eq!(
            map_key(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Some(Action::Quit)
        );
    }
}
