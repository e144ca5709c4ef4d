//! Persistent and in-process memory: the bounded response cache, the
//! JSON-backed conversation history, and user preferences.

pub mod cache;
pub mod history;
pub mod prefs;

pub use cache::ResponseCache;
pub use history::ConversationHistory;
pub use prefs::UserPreferences;
