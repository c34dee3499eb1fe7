//! Turning a caller's request into a drain and its reply text.
//!
//! Whatever front end sits in front of the tracker (the console today) hands
//! us the raw text the caller typed; we trim it, drain that key and render
//! the delivered items as a small JSON object, or a plain sentence when
//! there is nothing to deliver.

use serde::ser::{Serialize, Serializer};

use crate::tracker::Tracker;

/// Reply when the request text is blank.
pub const NO_KEY_PROVIDED: &str = "No country provided.";

/// Serialises `(key, items)` pairs as a JSON object in the given order.
struct OrderedMap<'a>(&'a [(String, Vec<String>)]);

impl Serialize for OrderedMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(key, items)| (key, items)))
    }
}

fn to_json(entries: &[(String, Vec<String>)]) -> String {
    // Strings and string arrays always serialise.
    serde_json::to_string_pretty(&OrderedMap(entries)).unwrap_or_default()
}

/// Drain the key named by `raw` and render the reply.
///
/// Unknown keys are not an error: they simply have no news.
pub fn respond(tracker: &Tracker, raw: &str) -> String {
    let key = raw.trim();
    if key.is_empty() {
        return NO_KEY_PROVIDED.to_string();
    }

    let items = tracker.get_and_clear(key);
    if items.is_empty() {
        return format!("No news available for {key}.");
    }
    to_json(&[(key.to_string(), items)])
}

/// Drain every key and render all of them, empty ones included.
pub fn respond_all(tracker: &Tracker) -> String {
    to_json(&tracker.get_and_clear_all())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
