//! Object identifier extraction
//!
//! Finds the first `CREATE [OR REPLACE] [EDITIONABLE|NONEDITIONABLE]
//! {PACKAGE BODY|PACKAGE|PROCEDURE|FUNCTION|TRIGGER} name` in a source text
//! and reports the object it defines. Names may be bare or double-quoted and
//! optionally schema-qualified, with any whitespace between tokens.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

static OBJECT_PATTERN: OnceLock<Regex> = OnceLock::new();
static QUALIFIER_DOT: OnceLock<Regex> = OnceLock::new();

fn object_pattern() -> &'static Regex {
    OBJECT_PATTERN.get_or_init(|| {
        Regex::new(
            r#"(?is)\bCREATE\s+(?:OR\s+REPLACE\s+)?(?:EDITIONABLE\s+|NONEDITIONABLE\s+)?(?P<kind>PACKAGE\s+BODY|PACKAGE|PROCEDURE|FUNCTION|TRIGGER)\s+(?P<full>(?:"[^"]+"|[\w$]+)(?:\s*\.\s*(?:"[^"]+"|[\w$]+))?)"#,
        )
        .expect("object pattern is a valid regex")
    })
}

fn qualifier_dot() -> &'static Regex {
    QUALIFIER_DOT.get_or_init(|| Regex::new(r"\s*\.\s*").expect("dot pattern is a valid regex"))
}

/// Kind of stored program unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectKind {
    Package,
    PackageBody,
    Procedure,
    Function,
    Trigger,
}

impl ObjectKind {
    fn from_match(text: &str) -> Self {
        let upper = text.to_uppercase();
        if upper.starts_with("PACKAGE") && upper.ends_with("BODY") {
            ObjectKind::PackageBody
        } else if upper == "PACKAGE" {
            ObjectKind::Package
        } else if upper == "PROCEDURE" {
            ObjectKind::Procedure
        } else if upper == "FUNCTION" {
            ObjectKind::Function
        } else {
            ObjectKind::Trigger
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Package => "PACKAGE",
            ObjectKind::PackageBody => "PACKAGE BODY",
            ObjectKind::Procedure => "PROCEDURE",
            ObjectKind::Function => "FUNCTION",
            ObjectKind::Trigger => "TRIGGER",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A program unit declared by a CREATE statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlObject {
    pub kind: ObjectKind,
    pub schema: Option<String>,
    pub name: String,
}

/// Extract the first program unit declared in `text`
pub fn extract_object(text: &str) -> Option<SqlObject> {
    let caps = object_pattern().captures(text)?;
    let kind = ObjectKind::from_match(caps.name("kind")?.as_str());

    let unquoted = caps.name("full")?.as_str().replace('"', "");
    let normalized = qualifier_dot().replace_all(&unquoted, ".");

    let (schema, name) = match normalized.rsplit_once('.') {
        Some((schema, name)) => (Some(schema.to_string()), name.to_string()),
        None => (None, normalized.into_owned()),
    };

    Some(SqlObject { kind, schema, name })
}

/// Extract the unqualified name of the first program unit declared in `text`
pub fn extract_object_name(text: &str) -> Option<String> {
    extract_object(text).map(|object| object.name)
}
