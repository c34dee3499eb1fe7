//! Console state.
//!
//! The console is a local consumer of the [`Tracker`]: it shows how many
//! undelivered items each key holds and lets the operator drain one key or
//! all of them.  Counts are re-read every tick with [`App::sync`], which never
//! drains.

use chrono::{DateTime, Utc};
use ratatui::widgets::ListState;

use crate::respond::{respond, respond_all};
use crate::tracker::Tracker;

pub struct App {
    /// Every tracked key with its undelivered item count, in tracker order.
    pub keys: Vec<(String, usize)>,
    /// List selection state for scrolling.
    pub list_state: ListState,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last action status message.
    pub status: String,
    /// Reply text of the most recent drain.
    pub delivery: String,
    /// When the tracker last finished a refresh cycle.
    pub last_refresh: Option<DateTime<Utc>>,
    /// Whether the background refresh loop is alive.
    pub refreshing: bool,
}

impl App {
    pub fn new() -> Self {
        Self {
            keys: Vec::new(),
            list_state: ListState::default(),
            quit: false,
            status: "Waiting for first refresh…".into(),
            delivery: String::new(),
            last_refresh: None,
            refreshing: false,
        }
    }

    /// Re-read pending counts and refresh time from the tracker.
    pub fn sync(&mut self, tracker: &Tracker) {
        self.keys = tracker.pending();
        self.last_refresh = tracker.last_refresh();
        self.refreshing = tracker.is_running();
        if self.list_state.selected().is_none() && !self.keys.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    /// Sum of undelivered items across all keys.
    pub fn total_pending(&self) -> usize {
        self.keys.iter().map(|(_, count)| count).sum()
    }

    pub fn selected_key(&self) -> Option<&str> {
        self.list_state
            .selected()
            .and_then(|i| self.keys.get(i))
            .map(|(key, _)| key.as_str())
    }

    // -- drains --------------------------------------------------------------

    /// Drain the highlighted key and show what was delivered.
    pub fn drain_selected(&mut self, tracker: &Tracker) {
        let Some(key) = self.selected_key().map(str::to_owned) else {
            return;
        };
        self.delivery = respond(tracker, &key);
        self.status = format!("Drained {key}");
        self.sync(tracker);
    }

    /// Drain every key at once and show what was delivered.
    pub fn drain_all(&mut self, tracker: &Tracker) {
        self.delivery = respond_all(tracker);
        self.status = "Drained all keys".into();
        self.sync(tracker);
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        if self.keys.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(self.keys.len() - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.keys.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.keys.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if !self.keys.is_empty() {
            self.list_state.select(Some(self.keys.len() - 1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerConfig;
    use crate::tracker::tests::ScriptedFetcher;
    use std::time::Duration;

    fn tracker(keys: &[&str]) -> Tracker {
        let config = TrackerConfig::new(keys.iter().copied(), 3, Duration::from_secs(30)).unwrap();
        Tracker::new(config, ScriptedFetcher::new(vec![]))
    }

    fn synced_app(t: &Tracker) -> App {
        let mut app = App::new();
        app.sync(t);
        app
    }

    // -- construction --------------------------------------------------------

    #[test]
    fn new_app_starts_empty() {
        let app = App::new();
        assert!(app.keys.is_empty());
        assert!(!app.quit);
        assert!(app.list_state.selected().is_none());
        assert!(app.delivery.is_empty());
    }

    #[test]
    fn sync_loads_keys_and_selects_first() {
        let t = tracker(&["Japan", "Germany"]);
        let app = synced_app(&t);
        assert_eq!(
            app.keys,
            vec![("Japan".to_string(), 0), ("Germany".to_string(), 0)]
        );
        assert_eq!(app.selected_key(), Some("Japan"));
    }

    #[tokio::test]
    async fn sync_does_not_drain() {
        let t = tracker(&["Japan"]);
        t.refresh_all().await;
        let mut app = synced_app(&t);
        app.sync(&t);
        assert_eq!(app.total_pending(), 1);
        assert!(app.last_refresh.is_some());
        assert_eq!(t.pending()[0].1, 1);
    }

    // -- drains --------------------------------------------------------------

    #[tokio::test]
    async fn drain_selected_delivers_only_that_key() {
        let t = tracker(&["Japan", "Germany"]);
        t.refresh_all().await;
        let mut app = synced_app(&t);

        app.drain_selected(&t);

        assert!(app.delivery.contains("Japan #1"), "got: {}", app.delivery);
        assert_eq!(
            app.keys,
            vec![("Japan".to_string(), 0), ("Germany".to_string(), 1)]
        );
    }

    #[test]
    fn drain_selected_with_nothing_pending_says_so() {
        let t = tracker(&["Japan"]);
        let mut app = synced_app(&t);
        app.drain_selected(&t);
        assert_eq!(app.delivery, "No news available for Japan.");
    }

    #[tokio::test]
    async fn drain_all_empties_every_key() {
        let t = tracker(&["Japan", "Germany"]);
        t.refresh_all().await;
        let mut app = synced_app(&t);

        app.drain_all(&t);

        assert!(app.delivery.contains("Germany #2"), "got: {}", app.delivery);
        assert_eq!(app.total_pending(), 0);
    }

    // -- navigation ----------------------------------------------------------

    #[test]
    fn navigation_on_empty_is_noop() {
        let mut app = App::new();
        app.select_next();
        app.select_previous();
        app.select_first();
        app.select_last();
        assert!(app.list_state.selected().is_none());
    }

    #[test]
    fn select_next_advances_and_clamps() {
        let t = tracker(&["Japan", "Germany", "Brazil"]);
        let mut app = synced_app(&t);

        app.select_next();
        assert_eq!(app.list_state.selected(), Some(1));
        app.select_next();
        app.select_next();
        assert_eq!(app.list_state.selected(), Some(2));
    }

    #[test]
    fn select_previous_moves_up_and_clamps() {
        let t = tracker(&["Japan", "Germany", "Brazil"]);
        let mut app = synced_app(&t);

        app.select_last();
        app.select_previous();
        assert_eq!(app.selected_key(), Some("Germany"));
        app.select_previous();
        app.select_previous();
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn select_first_and_last_jump() {
        let t = tracker(&["Japan", "Germany", "Brazil"]);
        let mut app = synced_app(&t);

        app.select_last();
        assert_eq!(app.selected_key(), Some("Brazil"));
        app.select_first();
        assert_eq!(app.selected_key(), Some("Japan"));
    }
}
