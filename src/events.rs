use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, View};

/// Rows skipped by PageUp/PageDown.
const PAGE: usize = 10;

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::PageUp => app.select_prev_n(PAGE),
        KeyCode::PageDown => app.select_next_n(PAGE),
        KeyCode::Home => app.select_first(),

        KeyCode::Enter => app.enter(),
        KeyCode::Esc | KeyCode::Backspace => app.go_back(),

        // Numbered menu entries, up to two digits
        KeyCode::Char(c @ '0'..='9') if app.current_view == View::Menu => {
            app.menu_digit(c as usize - '0' as usize);
        }

        KeyCode::Char('r') => app.refresh(),
        KeyCode::Char('?') => app.toggle_help(),

        // Shard distribution controls
        KeyCode::Char('g') => app.toggle_group_by(),
        KeyCode::Char('s') => app.cycle_sort(),

        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),
        // Right-click goes back
        MouseEventKind::Down(MouseButton::Right) => app.go_back(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::source::FileSource;

    fn app() -> App {
        App::new(Box::new(FileSource::new("missing.json")), Settings::default())
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_menu_navigation() {
        let mut app = app();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.menu_index, 1);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.current_view, View::DeepDive);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.current_view, View::Menu);
    }

    #[test]
    fn test_numbered_entry() {
        let mut app = app();
        press(&mut app, KeyCode::Char('9'));
        assert_eq!(app.current_view, View::Dusty);

        // Digits only work from the menu
        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.current_view, View::Dusty);
    }

    #[test]
    fn test_two_digit_entries() {
        let mut app = app();
        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.current_view, View::Menu);
        assert_eq!(app.menu_index, 0);
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.current_view, View::Toxicity);

        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Char('0'));
        assert_eq!(app.current_view, View::Drift);

        // `1` then Enter opens the first entry
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.current_view, View::Dashboard);
    }

    #[test]
    fn test_second_digit_out_of_range_starts_over() {
        let mut app = app();
        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Char('5'));
        assert_eq!(app.current_view, View::NodeLoad);
    }

    #[test]
    fn test_help_swallows_next_key() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.show_help);
        assert!(app.running);

        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }

    #[test]
    fn test_scroll_in_views() {
        let mut app = app();
        press(&mut app, KeyCode::Char('3'));
        press(&mut app, KeyCode::PageDown);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.scroll, 9);
        press(&mut app, KeyCode::Home);
        assert_eq!(app.scroll, 0);

        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.group_by, crate::analysis::GroupBy::Index);
    }
}
