//! Statement kinds and traversal events
//!
//! A grammar front end reports the statements it walks through as a
//! depth-first stream of enter/exit events. Only six kinds survive:
//! - `Root`: sentinel at the top of every tree
//! - `Select`: standalone queries and parenthesized sub-queries alike
//! - `Insert`, `Update`, `Delete`, `Merge`: data manipulation statements

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The statement kinds retained from the full grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatementKind {
    Root,
    Select,
    Insert,
    Update,
    Delete,
    Merge,
}

impl StatementKind {
    /// Get the tag used in artifacts
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::Root => "ROOT",
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
            StatementKind::Merge => "MERGE",
        }
    }

    /// Map a leading SQL keyword to a statement kind.
    ///
    /// The keyword must already be upper-cased.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "SELECT" => Some(StatementKind::Select),
            "INSERT" => Some(StatementKind::Insert),
            "UPDATE" => Some(StatementKind::Update),
            "DELETE" => Some(StatementKind::Delete),
            "MERGE" => Some(StatementKind::Merge),
            _ => None,
        }
    }
}

impl FromStr for StatementKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "ROOT" => Ok(StatementKind::Root),
            other => Self::from_keyword(other).ok_or_else(|| Error::InvalidKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether the walk is entering or leaving a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Enter,
    Exit,
}

/// One step of a depth-first walk over the parse tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementEvent {
    pub phase: Phase,
    pub kind: StatementKind,
    /// Source line (1-indexed)
    pub line: u32,
}

impl StatementEvent {
    pub fn enter(kind: StatementKind, line: u32) -> Self {
        Self { phase: Phase::Enter, kind, line }
    }

    pub fn exit(kind: StatementKind, line: u32) -> Self {
        Self { phase: Phase::Exit, kind, line }
    }
}
