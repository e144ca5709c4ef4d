use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::types::{ChatMessage, Role};

/// Archived chunks kept in memory after compaction.
const MAX_ARCHIVED_CHUNKS: usize = 10;

/// Summary statistics over the conversation history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistorySummary {
    pub total_messages: usize,
    pub user_messages: usize,
    pub assistant_messages: usize,
    pub avg_user_length: usize,
    pub avg_assistant_length: usize,
}

/// Ordered `{role, content}` records persisted as pretty-printed JSON at
/// `<state>/memory/conversation_history.json`.
pub struct ConversationHistory {
    messages: Vec<ChatMessage>,
    archived: VecDeque<Vec<ChatMessage>>,
    path: PathBuf,
    max_messages: usize,
}

impl ConversationHistory {
    /// Load history from disk. A missing file starts empty; a corrupt file
    /// is logged and abandoned rather than refusing to start.
    pub fn load(path: impl Into<PathBuf>, max_messages: usize) -> Self {
        let path = path.into();
        let messages = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Vec<ChatMessage>>(&content) {
                Ok(messages) => {
                    info!(count = messages.len(), "loaded conversation history");
                    messages
                }
                Err(e) => {
                    warn!("corrupt history at {}: {e}; starting fresh", path.display());
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };

        Self {
            messages,
            archived: VecDeque::new(),
            path,
            max_messages: max_messages.max(2),
        }
    }

    /// Persist the history, creating the memory directory if needed.
    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| anyhow::anyhow!("failed to create {}: {e}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.messages)?;
        std::fs::write(&self.path, json)
            .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", self.path.display()))?;
        Ok(())
    }

    /// Append a turn and compact if the history has outgrown its bound.
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.compact();
    }

    /// Once past `max_messages`, keep the most recent half and archive the
    /// older prefix as a chunk. At most `MAX_ARCHIVED_CHUNKS` chunks are kept.
    pub fn compact(&mut self) {
        if self.messages.len() <= self.max_messages {
            return;
        }

        let keep = self.max_messages / 2;
        let split = self.messages.len() - keep;
        let chunk: Vec<ChatMessage> = self.messages.drain(..split).collect();

        self.archived.push_back(chunk);
        while self.archived.len() > MAX_ARCHIVED_CHUNKS {
            self.archived.pop_front();
        }
        info!(
            kept = self.messages.len(),
            chunks = self.archived.len(),
            "compacted conversation history"
        );
    }

    /// The most recent `n` messages, oldest first.
    pub fn recent(&self, n: usize) -> &[ChatMessage] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    pub fn all(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn archived_chunks(&self) -> usize {
        self.archived.len()
    }

    /// Case-insensitive substring search. Returns (index, message) pairs.
    pub fn search(&self, query: &str) -> Vec<(usize, &ChatMessage)> {
        let query = query.to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }
        self.messages
            .iter()
            .enumerate()
            .filter(|(_, m)| m.content.to_lowercase().contains(&query))
            .collect()
    }

    pub fn summary(&self) -> HistorySummary {
        let mut user = (0usize, 0usize);
        let mut assistant = (0usize, 0usize);
        for m in &self.messages {
            match m.role {
                Role::User => {
                    user.0 += 1;
                    user.1 += m.content.len();
                }
                Role::Assistant => {
                    assistant.0 += 1;
                    assistant.1 += m.content.len();
                }
                Role::System => {}
            }
        }

        HistorySummary {
            total_messages: self.messages.len(),
            user_messages: user.0,
            assistant_messages: assistant.0,
            avg_user_length: if user.0 > 0 { user.1 / user.0 } else { 0 },
            avg_assistant_length: if assistant.0 > 0 {
                assistant.1 / assistant.0
            } else {
                0
            },
        }
    }

    /// Drop everything, in memory and on disk.
    pub fn clear(&mut self) -> anyhow::Result<()> {
        self.messages.clear();
        self.archived.clear();
        self.save()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
