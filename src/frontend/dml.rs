//! DML statement scanner
//!
//! A lightweight grammar front end for SQL and PL/SQL sources. It walks the
//! token stream and reports where SELECT, INSERT, UPDATE, DELETE and MERGE
//! statements begin and end. Everything else (FROM, WHERE, expressions,
//! joins, block structure) is skipped.

use super::framework::GrammarFrontEnd;
use super::lexer::{tokenize, Token, TokenKind};
use crate::statement::{StatementEvent, StatementKind};
use crate::{Error, Result};

/// Words after which a DML keyword is part of a clause, not a statement.
/// Covers trigger event lists (`BEFORE INSERT OR UPDATE OF c ON t`),
/// referential actions (`ON DELETE CASCADE`) and privilege lists.
const CLAUSE_PRECEDERS: &[&str] = &[
    "BEFORE", "AFTER", "OR", "OF", "ON", "INSTEAD", "GRANT", "REVOKE", "AUDIT", "NOAUDIT",
];

/// Words that continue an open statement even at the start of a line
/// (`UNION ALL\nSELECT`, `FOR\nUPDATE`).
const CONTINUATIONS: &[&str] = &["UNION", "ALL", "INTERSECT", "MINUS", "EXCEPT", "FOR", "THEN"];

#[derive(Debug, Clone, Copy)]
struct OpenStatement {
    kind: StatementKind,
    /// Paren depth the statement was opened at
    depth: usize,
    /// Opened directly after `(`; ends on the line of the matching `)`
    parenthesized: bool,
    /// Opened by `WITH`; the main SELECT of the query is still to come
    awaiting_query: bool,
}

#[derive(Debug, Default)]
struct ScanState {
    open: Vec<OpenStatement>,
    depth: usize,
    last_line: u32,
    events: Vec<StatementEvent>,
}

impl ScanState {
    fn open_at_depth(&self) -> Option<&OpenStatement> {
        self.open.last().filter(|s| s.depth == self.depth)
    }

    fn push(&mut self, kind: StatementKind, line: u32, parenthesized: bool, awaiting_query: bool) {
        self.open.push(OpenStatement {
            kind,
            depth: self.depth,
            parenthesized,
            awaiting_query,
        });
        self.events.push(StatementEvent::enter(kind, line));
    }

    /// Close every statement opened at `min_depth` or deeper
    fn close_from(&mut self, min_depth: usize, close_paren_line: Option<u32>) {
        while let Some(top) = self.open.last().copied() {
            if top.depth < min_depth {
                break;
            }
            self.open.pop();
            let line = match close_paren_line {
                Some(line) if top.parenthesized => line,
                _ => self.last_line,
            };
            self.events.push(StatementEvent::exit(top.kind, line));
        }
    }
}

/// What a DML keyword means at its position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// Opens a statement, nested in whatever is open
    Open,
    /// Ends the statement open at this depth and opens a sibling
    Restart,
    /// The main SELECT of a `WITH` query
    WithBody,
    /// Part of the open statement or of a clause
    Clause,
}

/// Built-in front end that recognizes DML statements from tokens.
#[derive(Debug, Default, Clone)]
pub struct DmlScanner;

impl DmlScanner {
    pub fn new() -> Self {
        Self
    }

    fn follows_clause_word(prev: Option<&Token>) -> bool {
        match prev {
            None => false,
            Some(token) => match token.kind {
                TokenKind::Word => CLAUSE_PRECEDERS.iter().any(|w| token.is_word(w)),
                TokenKind::Symbol => token.is_symbol(".") || token.is_symbol(","),
                _ => false,
            },
        }
    }

    /// Decide what a DML keyword does at its position
    fn place(state: &ScanState, kind: StatementKind, token: &Token, prev: Option<&Token>) -> Placement {
        let Some(open) = state.open_at_depth() else {
            return if Self::follows_clause_word(prev) {
                Placement::Clause
            } else {
                Placement::Open
            };
        };

        if open.awaiting_query && kind == StatementKind::Select {
            return Placement::WithBody;
        }
        // INSERT ... SELECT nests the query
        if open.kind == StatementKind::Insert && kind == StatementKind::Select {
            return Placement::Open;
        }

        // A keyword leading its line starts a new statement when the
        // previous one was left without `;`. MERGE actions never do.
        let leads_line = prev.is_some_and(|p| p.line < token.line);
        let continues = Self::follows_clause_word(prev)
            || prev.is_some_and(|p| CONTINUATIONS.iter().any(|w| p.is_word(w)));
        if leads_line && !continues && !open.awaiting_query && open.kind != StatementKind::Merge {
            return Placement::Restart;
        }

        // UNION SELECT, FOR UPDATE, MERGE actions
        Placement::Clause
    }

    /// `WITH name [(cols)] AS` or `WITH RECURSIVE`; not `WITH TIME ZONE`,
    /// `START WITH`, `WITH CHECK OPTION`
    fn starts_with_query(tokens: &[Token], idx: usize) -> bool {
        let mut rest = tokens[idx + 1..].iter();
        let Some(name) = rest.next() else {
            return false;
        };
        if name.is_word("RECURSIVE") {
            return true;
        }
        if !matches!(name.kind, TokenKind::Word | TokenKind::QuotedIdent) {
            return false;
        }
        rest.next()
            .is_some_and(|next| next.is_word("AS") || next.kind == TokenKind::OpenParen)
    }

    /// A `/` alone on its line ends the statement, SQL*Plus style
    fn is_slash_terminator(tokens: &[Token], idx: usize) -> bool {
        let token = &tokens[idx];
        if !token.is_symbol("/") {
            return false;
        }
        let alone_before = idx == 0 || tokens[idx - 1].line < token.line;
        let alone_after = tokens.get(idx + 1).is_none_or(|next| next.line > token.line);
        alone_before && alone_after
    }
}

impl GrammarFrontEnd for DmlScanner {
    fn name(&self) -> &str {
        "dml-scanner"
    }

    fn events(&self, text: &str) -> Result<Vec<StatementEvent>> {
        let tokens = tokenize(text)?;
        let mut state = ScanState::default();

        for (idx, token) in tokens.iter().enumerate() {
            let prev = idx.checked_sub(1).map(|i| &tokens[i]);

            match token.kind {
                TokenKind::OpenParen => state.depth += 1,
                TokenKind::CloseParen => {
                    if state.depth == 0 {
                        return Err(Error::Parse {
                            line: token.line,
                            message: "unbalanced ')'".to_string(),
                        });
                    }
                    state.close_from(state.depth, Some(token.line));
                    state.depth -= 1;
                }
                TokenKind::Semicolon => state.close_from(state.depth, None),
                TokenKind::Symbol if Self::is_slash_terminator(&tokens, idx) => {
                    state.close_from(0, None);
                    state.depth = 0;
                }
                TokenKind::Word => {
                    let keyword = token.text.to_ascii_uppercase();
                    let with_query = keyword == "WITH" && Self::starts_with_query(&tokens, idx);
                    let kind = match StatementKind::from_keyword(&keyword) {
                        Some(kind) => kind,
                        None if with_query => StatementKind::Select,
                        None => {
                            state.last_line = token.line;
                            continue;
                        }
                    };

                    match Self::place(&state, kind, token, prev) {
                        Placement::Clause => {}
                        Placement::WithBody => {
                            if let Some(open) = state.open.last_mut() {
                                open.awaiting_query = false;
                            }
                        }
                        placement => {
                            if placement == Placement::Restart {
                                state.close_from(state.depth, None);
                            }
                            match prev {
                                Some(p) if p.kind == TokenKind::OpenParen => {
                                    state.push(kind, p.line, true, with_query)
                                }
                                _ => state.push(kind, token.line, false, with_query),
                            }
                        }
                    }
                }
                _ => {}
            }

            state.last_line = token.line;
        }

        state.close_from(0, None);
        tracing::trace!(events = state.events.len(), "scanned statements");
        Ok(state.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{ArtifactNode, TreeBuilder};
    use StatementKind::*;

    fn skeleton(sql: &str) -> ArtifactNode {
        let events = DmlScanner::new().events(sql).unwrap();
        TreeBuilder::build(events).unwrap().to_artifact()
    }

    /// (kind, start, end) in pre-order, ROOT excluded
    fn flatten(node: &ArtifactNode) -> Vec<(StatementKind, u32, u32)> {
        let mut out = Vec::new();
        for child in &node.children {
            out.push((child.kind, child.start_line, child.end_line));
            out.extend(flatten(child));
        }
        out
    }

    #[test]
    fn test_update_with_in_subquery_on_one_line() {
        let root = skeleton("UPDATE t SET x=1 WHERE id IN (SELECT id FROM t2);");
        assert_eq!(root.children.len(), 1);
        let update = &root.children[0];
        assert_eq!((update.kind, update.start_line, update.end_line), (Update, 1, 1));
        assert_eq!(update.children.len(), 1);
        let select = &update.children[0];
        assert_eq!((select.kind, select.start_line, select.end_line), (Select, 1, 1));
    }

    #[test]
    fn test_multiline_statements_in_source_order() {
        let sql = "\
SELECT a
  FROM t
 WHERE b = 1;

DELETE FROM t
 WHERE c IN (
   SELECT c
     FROM u
 );
";
        assert_eq!(
            flatten(&skeleton(sql)),
            vec![(Select, 1, 3), (Delete, 5, 9), (Select, 6, 9)]
        );
    }

    #[test]
    fn test_nested_subselects_are_all_select() {
        let sql = "SELECT * FROM (SELECT * FROM (SELECT 1 FROM dual) x) y;";
        let kinds: Vec<_> = flatten(&skeleton(sql)).into_iter().map(|(k, _, _)| k).collect();
        assert_eq!(kinds, vec![Select, Select, Select]);
    }

    #[test]
    fn test_insert_select_nests_query() {
        let sql = "INSERT INTO t (a, b)\nSELECT a, b FROM s\nUNION ALL\nSELECT a, b FROM r;";
        assert_eq!(flatten(&skeleton(sql)), vec![(Insert, 1, 4), (Select, 2, 4)]);
    }

    #[test]
    fn test_clauses_are_not_statements() {
        let sql = "\
CREATE OR REPLACE TRIGGER trg
BEFORE INSERT OR UPDATE OF amount ON orders
FOR EACH ROW
BEGIN
  SELECT amount INTO v FROM limits WHERE id = 1 FOR UPDATE;
  v_tab.DELETE;
END;
/
";
        assert_eq!(flatten(&skeleton(sql)), vec![(Select, 5, 5)]);
    }

    #[test]
    fn test_merge_actions_stay_inside_merge() {
        let sql = "\
MERGE INTO t USING (SELECT id FROM s) src ON (t.id = src.id)
WHEN MATCHED THEN UPDATE SET t.v = 1
WHEN NOT MATCHED THEN INSERT (id) VALUES (src.id);
";
        assert_eq!(flatten(&skeleton(sql)), vec![(Merge, 1, 3), (Select, 1, 1)]);
    }

    #[test]
    fn test_plsql_block_statements() {
        let sql = "\
CREATE OR REPLACE PROCEDURE p1 IS
BEGIN
  UPDATE emp SET sal = sal * 1.1;
  IF SQL%ROWCOUNT > 0 THEN
    INSERT INTO audit_log VALUES (SYSDATE, 'raise');
  ELSE
    DELETE FROM emp WHERE id = 0;
  END IF;
END;
/
";
        assert_eq!(
            flatten(&skeleton(sql)),
            vec![(Update, 3, 3), (Insert, 5, 5), (Delete, 7, 7)]
        );
    }

    #[test]
    fn test_slash_closes_unterminated_statement() {
        let sql = "CREATE VIEW v AS\nSELECT a FROM t\n/\nSELECT b FROM u;";
        assert_eq!(flatten(&skeleton(sql)), vec![(Select, 2, 2), (Select, 4, 4)]);
    }

    #[test]
    fn test_division_is_not_a_terminator() {
        let sql = "SELECT a\n / 2 FROM t;";
        assert_eq!(flatten(&skeleton(sql)), vec![(Select, 1, 2)]);
    }

    #[test]
    fn test_statement_without_semicolon_ends_at_input_end() {
        assert_eq!(flatten(&skeleton("SELECT 1\nFROM dual")), vec![(Select, 1, 2)]);
    }

    #[test]
    fn test_with_query_encloses_its_ctes() {
        let sql = "WITH c AS (\n  SELECT 1 x FROM dual\n)\nSELECT * FROM c;";
        assert_eq!(flatten(&skeleton(sql)), vec![(Select, 1, 4), (Select, 1, 3)]);
    }

    #[test]
    fn test_insert_with_query_is_one_select() {
        let sql = "INSERT INTO t\nWITH c AS (SELECT 1 FROM dual)\nSELECT * FROM c;";
        assert_eq!(
            flatten(&skeleton(sql)),
            vec![(Insert, 1, 3), (Select, 2, 3), (Select, 2, 2)]
        );
    }

    #[test]
    fn test_with_outside_queries_is_ignored() {
        let sql = "SELECT id FROM emp\nSTART WITH mgr IS NULL CONNECT BY PRIOR id = mgr;\nCREATE VIEW v AS SELECT 1 FROM dual WITH READ ONLY;";
        assert_eq!(flatten(&skeleton(sql)), vec![(Select, 1, 2), (Select, 3, 3)]);
    }

    #[test]
    fn test_keyword_leading_a_line_ends_unterminated_statement() {
        let sql = "SELECT a FROM t\nDELETE FROM u;";
        assert_eq!(flatten(&skeleton(sql)), vec![(Select, 1, 1), (Delete, 2, 2)]);

        let sql = "SELECT a FROM t\nUNION\nSELECT b FROM u\nFOR\nUPDATE;";
        assert_eq!(flatten(&skeleton(sql)), vec![(Select, 1, 5)]);

        let sql = "MERGE INTO t USING s ON (t.id = s.id)\nWHEN MATCHED THEN\nUPDATE SET t.v = 1;";
        assert_eq!(flatten(&skeleton(sql)), vec![(Merge, 1, 3)]);
    }

    #[test]
    fn test_unbalanced_close_paren_fails() {
        let err = DmlScanner::new().events("SELECT 1)\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }

    #[test]
    fn test_events_are_balanced() {
        let sql = "SELECT (SELECT 1 FROM dual) FROM (SELECT 2 FROM dual WHERE x IN (SELECT 3 FROM dual";
        let events = DmlScanner::new().events(sql).unwrap();
        assert_eq!(events.len(), 8);
        assert!(TreeBuilder::build(events).is_ok());
    }
}
