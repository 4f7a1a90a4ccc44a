//! Conversation memory: a bounded log of recent turns.
//!
//! Rendered into a context block that biases the next synthesis. One memory
//! belongs to one conversation; it is not shared between callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Turns kept when no capacity is configured.
pub const DEFAULT_CAPACITY: usize = 6;

const CONTEXT_HEADER: &str = "Conversation context:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Ring buffer of turns, oldest first.
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    turns: VecDeque<ConversationTurn>,
    capacity: usize,
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ConversationMemory {
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turns: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn turns(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.turns.iter()
    }

    /// Record a turn; blank text is ignored.
    pub fn append(&mut self, role: Role, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.turns.push_back(ConversationTurn {
            role,
            text: text.to_string(),
            timestamp: Utc::now(),
        });
        while self.turns.len() > self.capacity {
            self.turns.pop_front();
        }
    }

    /// Header plus one `[role] text` line per turn; empty when no turns exist.
    pub fn render_context(&self) -> String {
        if self.turns.is_empty() {
            return String::new();
        }
        let mut out = String::from(CONTEXT_HEADER);
        out.push('\n');
        for turn in &self.turns {
            out.push_str(&format!("[{}] {}\n", turn.role, turn.text));
        }
        out
    }

    /// Most recent user text, or `""`.
    pub fn last_user_turn(&self) -> &str {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == Role::User)
            .map(|t| t.text.as_str())
            .unwrap_or("")
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_most_recent_turns_in_order() {
        let mut memory = ConversationMemory::new(3);
        for i in 0..5 {
            memory.append(Role::User, &format!("turn {i}"));
        }
        assert_eq!(memory.len(), 3);
        let texts: Vec<_> = memory.turns().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["turn 2", "turn 3", "turn 4"]);
    }

    #[test]
    fn blank_text_is_ignored() {
        let mut memory = ConversationMemory::default();
        memory.append(Role::User, "   \n\t");
        assert!(memory.is_empty());
    }

    #[test]
    fn text_is_trimmed() {
        let mut memory = ConversationMemory::default();
        memory.append(Role::User, "  hi  ");
        assert_eq!(memory.last_user_turn(), "hi");
    }

    #[test]
    fn zero_capacity_is_floored() {
        let mut memory = ConversationMemory::new(0);
        assert_eq!(memory.capacity(), 1);
        memory.append(Role::User, "a");
        memory.append(Role::User, "b");
        assert_eq!(memory.last_user_turn(), "b");
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn render_context_empty_and_populated() {
        let mut memory = ConversationMemory::default();
        assert_eq!(memory.render_context(), "");

        memory.append(Role::User, "点击登录按钮");
        memory.append(Role::Assistant, "status: true, report: r.json");
        assert_eq!(
            memory.render_context(),
            "Conversation context:\n[user] 点击登录按钮\n[assistant] status: true, report: r.json\n"
        );
    }

    #[test]
    fn last_user_turn_skips_assistant() {
        let mut memory = ConversationMemory::default();
        assert_eq!(memory.last_user_turn(), "");
        memory.append(Role::User, "first");
        memory.append(Role::Assistant, "ok");
        assert_eq!(memory.last_user_turn(), "first");
    }
}
