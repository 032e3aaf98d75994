//! Grammar front-end framework
//!
//! Defines the seam between the statement tree and whatever grammar
//! tokenizes and walks the source.

use crate::statement::StatementEvent;
use crate::tree::{StatementTree, TreeBuilder};
use crate::Result;

/// Trait for grammar front ends
///
/// A front end is responsible for:
/// 1. Tokenizing and parsing raw source text
/// 2. Walking the parse tree depth-first
/// 3. Reporting recognized statements as enter/exit events, with enter in
///    pre-order and the matching exit in post-order
///
/// A grammar-level failure is reported as [`crate::Error::Parse`].
pub trait GrammarFrontEnd: Send + Sync {
    /// Get the front end name (for logging)
    fn name(&self) -> &str;

    /// Produce the depth-first event stream for `text`
    fn events(&self, text: &str) -> Result<Vec<StatementEvent>>;

    /// Parse `text` straight into a finished statement tree
    fn parse(&self, text: &str) -> Result<StatementTree> {
        TreeBuilder::build(self.events(text)?)
    }
}

impl<T: GrammarFrontEnd + ?Sized> GrammarFrontEnd for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn events(&self, text: &str) -> Result<Vec<StatementEvent>> {
        (**self).events(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::StatementKind;

    struct FixedFrontEnd(Vec<StatementEvent>);

    impl GrammarFrontEnd for FixedFrontEnd {
        fn name(&self) -> &str { "fixed" }
        fn events(&self, _text: &str) -> Result<Vec<StatementEvent>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_parse_builds_tree_from_events() {
        let front_end: Box<dyn GrammarFrontEnd> = Box::new(FixedFrontEnd(vec![
            StatementEvent::enter(StatementKind::Insert, 1),
            StatementEvent::exit(StatementKind::Insert, 2),
        ]));

        let tree = front_end.parse("ignored").unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(front_end.name(), "fixed");
    }

    #[test]
    fn test_parse_rejects_malformed_stream() {
        let front_end = FixedFrontEnd(vec![StatementEvent::enter(StatementKind::Insert, 1)]);
        assert!(front_end.parse("ignored").is_err());
    }
}
