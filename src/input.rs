//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] actions.  Adding a new keybinding is
//! a single match arm in [`handle_key_event`].
//!
//! ## For contributors
//!
//! To add a new keybinding:
//!
//! 1. Add a method on [`App`] for the action (if one doesn't exist).
//! 2. Add a `KeyCode` match arm in [`handle_key_event`] that calls it.
//! 3. Update the help text in `ui::draw_status_bar`.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::App;
use crate::tracker::Tracker;

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress drains at most once.
pub fn handle_key_event(app: &mut App, tracker: &Tracker, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit = true,
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Enter => app.drain_selected(tracker),
        KeyCode::Char('a') => app.drain_all(tracker),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerConfig;
    use crate::tracker::tests::ScriptedFetcher;
    use std::time::Duration;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn setup() -> (App, Tracker) {
        let config =
            TrackerConfig::new(["Japan", "Germany"], 3, Duration::from_secs(30)).unwrap();
        let tracker = Tracker::new(config, ScriptedFetcher::new(vec![]));
        let mut app = App::new();
        app.sync(&tracker);
        (app, tracker)
    }

    #[test]
    fn q_and_esc_quit() {
        for code in [KeyCode::Char('q'), KeyCode::Esc] {
            let (mut app, t) = setup();
            handle_key_event(&mut app, &t, press(code));
            assert!(app.quit);
        }
    }

    #[test]
    fn ctrl_c_quits() {
        let (mut app, t) = setup();
        handle_key_event(
            &mut app,
            &t,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(app.quit);
    }

    #[test]
    fn j_and_k_move_selection() {
        let (mut app, t) = setup();
        handle_key_event(&mut app, &t, press(KeyCode::Char('j')));
        assert_eq!(app.selected_key(), Some("Germany"));
        handle_key_event(&mut app, &t, press(KeyCode::Char('k')));
        assert_eq!(app.selected_key(), Some("Japan"));
    }

    #[tokio::test]
    async fn enter_drains_selected_key() {
        let (mut app, t) = setup();
        t.refresh_all().await;
        handle_key_event(&mut app, &t, press(KeyCode::Enter));
        assert!(app.delivery.contains("Japan #1"));
        assert_eq!(t.pending()[0].1, 0);
        assert_eq!(t.pending()[1].1, 1);
    }

    #[tokio::test]
    async fn a_drains_everything() {
        let (mut app, t) = setup();
        t.refresh_all().await;
        handle_key_event(&mut app, &t, press(KeyCode::Char('a')));
        assert!(t.pending().iter().all(|(_, n)| *n == 0));
    }

    #[test]
    fn key_release_is_ignored() {
        let (mut app, t) = setup();
        let mut release = press(KeyCode::Char('q'));
        release.kind = KeyEventKind::Release;
        handle_key_event(&mut app, &t, release);
        assert!(!app.quit);
    }
}
