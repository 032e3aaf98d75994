//! Statement tree and its builder
//!
//! The builder consumes enter/exit events with an explicit LIFO stack:
//! - Enter pushes a new child under the current top
//! - Exit pops the top and seals its end line
//! - ROOT is a sentinel that is never pushed by an event and never popped
//!
//! Nodes live in an arena and refer to their parent by id, so the parent
//! link is a back reference rather than an ownership edge.

use crate::statement::{Phase, StatementEvent, StatementKind};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Index of a node inside a [`StatementTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The ROOT sentinel id
    pub fn root() -> Self {
        Self(0)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// One statement in the tree
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: StatementKind,
    /// Starting line number (1-indexed, 0 for ROOT)
    pub start_line: u32,
    /// Ending line number (1-indexed, inclusive)
    pub end_line: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(kind: StatementKind, start_line: u32, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            start_line,
            end_line: start_line,
            parent,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// A finished statement tree. Every node's end line is sealed.
#[derive(Debug, Clone)]
pub struct StatementTree {
    nodes: Vec<Node>,
}

impl StatementTree {
    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    /// Get a node by id
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Children of a node in source order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(Node::children).unwrap_or_default()
    }

    /// Parent of a node (None for ROOT)
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    /// Number of nodes, ROOT included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the tree holds nothing but ROOT
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Node ids in pre-order (ROOT first)
    pub fn depth_first(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut pending = vec![NodeId::root()];

        while let Some(id) = pending.pop() {
            order.push(id);
            pending.extend(self.children(id).iter().rev().copied());
        }

        order
    }

    /// Convert into the owned, serializable artifact form
    pub fn to_artifact(&self) -> ArtifactNode {
        self.artifact_at(NodeId::root())
    }

    fn artifact_at(&self, id: NodeId) -> ArtifactNode {
        let node = &self.nodes[id.index()];
        ArtifactNode {
            kind: node.kind,
            start_line: node.start_line,
            end_line: node.end_line,
            children: node.children.iter().map(|&c| self.artifact_at(c)).collect(),
        }
    }
}

/// JSON shape of an analysis artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactNode {
    #[serde(rename = "type")]
    pub kind: StatementKind,
    pub start_line: u32,
    pub end_line: u32,
    #[serde(default)]
    pub children: Vec<ArtifactNode>,
}

impl ArtifactNode {
    /// Number of statements below this node
    pub fn statement_count(&self) -> usize {
        self.children.iter().map(|c| 1 + c.statement_count()).sum()
    }
}

/// Assembles a [`StatementTree`] from a depth-first event stream.
#[derive(Debug)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
    stack: Vec<NodeId>,
}

impl TreeBuilder {
    /// Create a builder holding only the ROOT sentinel
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(StatementKind::Root, 0, None)],
            stack: vec![NodeId::root()],
        }
    }

    /// Build a tree from a complete event stream
    pub fn build<I>(events: I) -> Result<StatementTree>
    where
        I: IntoIterator<Item = StatementEvent>,
    {
        let mut builder = Self::new();
        for event in events {
            builder.handle(event)?;
        }
        builder.finish()
    }

    /// Apply one event
    pub fn handle(&mut self, event: StatementEvent) -> Result<()> {
        match event.phase {
            Phase::Enter => self.enter(event.kind, event.line),
            Phase::Exit => self.exit(event.kind, event.line),
        }
    }

    fn enter(&mut self, kind: StatementKind, line: u32) -> Result<()> {
        if kind == StatementKind::Root {
            return Err(Error::UnbalancedEvent {
                line,
                message: "ROOT cannot be entered".to_string(),
            });
        }

        let parent = self.top();
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(kind, line, Some(parent)));
        self.nodes[parent.index()].children.push(id);
        self.stack.push(id);
        Ok(())
    }

    fn exit(&mut self, kind: StatementKind, line: u32) -> Result<()> {
        if self.stack.len() == 1 {
            return Err(Error::UnbalancedEvent {
                line,
                message: format!("exit {} without a matching enter", kind),
            });
        }

        let top = self.top();
        let node = &mut self.nodes[top.index()];
        if node.kind != kind {
            return Err(Error::UnbalancedEvent {
                line,
                message: format!("exit {} while {} is open", kind, node.kind),
            });
        }
        if line < node.start_line {
            return Err(Error::UnbalancedEvent {
                line,
                message: format!("{} ends before it starts (line {})", kind, node.start_line),
            });
        }

        node.end_line = line;
        self.stack.pop();
        Ok(())
    }

    fn top(&self) -> NodeId {
        // ROOT is never popped, so the stack is never empty
        self.stack.last().copied().unwrap_or_else(NodeId::root)
    }

    /// Number of statements currently open
    pub fn open_statements(&self) -> usize {
        self.stack.len() - 1
    }

    /// Seal the tree. Fails if any statement is still open.
    pub fn finish(mut self) -> Result<StatementTree> {
        let open = self.open_statements();
        if open > 0 {
            return Err(Error::UnclosedStatements(open));
        }

        let last_line = self.nodes.iter().map(|n| n.end_line).max().unwrap_or(0);
        self.nodes[0].end_line = last_line;

        Ok(StatementTree { nodes: self.nodes })
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use StatementKind::*;

    fn enter(kind: StatementKind, line: u32) -> StatementEvent {
        StatementEvent::enter(kind, line)
    }

    fn exit(kind: StatementKind, line: u32) -> StatementEvent {
        StatementEvent::exit(kind, line)
    }

    #[test]
    fn test_update_with_subselect() {
        let tree = TreeBuilder::build([
            enter(Update, 3),
            enter(Select, 3),
            exit(Select, 3),
            exit(Update, 3),
        ])
        .unwrap();

        let root = tree.root();
        assert_eq!(root.kind, Root);
        assert_eq!(root.children().len(), 1);

        let update_id = root.children()[0];
        let update = tree.node(update_id).unwrap();
        assert_eq!((update.kind, update.start_line, update.end_line), (Update, 3, 3));

        let select_id = update.children()[0];
        let select = tree.node(select_id).unwrap();
        assert_eq!((select.kind, select.start_line, select.end_line), (Select, 3, 3));
        assert_eq!(tree.parent(select_id), Some(update_id));
        assert_eq!(tree.parent(update_id), Some(NodeId::root()));
        assert_eq!(tree.parent(NodeId::root()), None);
    }

    #[test]
    fn test_ranges_nest_and_siblings_ordered() {
        let tree = TreeBuilder::build([
            enter(Insert, 1),
            enter(Select, 2),
            enter(Select, 3),
            exit(Select, 4),
            exit(Select, 5),
            exit(Insert, 5),
            enter(Delete, 7),
            exit(Delete, 8),
            enter(Merge, 10),
            exit(Merge, 14),
        ])
        .unwrap();

        for id in tree.depth_first() {
            let node = tree.node(id).unwrap();
            assert!(node.start_line <= node.end_line);

            let mut previous_end = None;
            for &child_id in tree.children(id) {
                let child = tree.node(child_id).unwrap();
                assert!(child.start_line >= node.start_line);
                assert!(child.end_line <= node.end_line);
                if let Some(end) = previous_end {
                    assert!(child.start_line > end);
                }
                previous_end = Some(child.end_line);
            }
        }

        assert_eq!(tree.len(), 6);
        assert_eq!(tree.root().end_line, 14);
    }

    #[test]
    fn test_depth_first_is_preorder() {
        let tree = TreeBuilder::build([
            enter(Update, 1),
            enter(Select, 1),
            exit(Select, 1),
            exit(Update, 1),
            enter(Delete, 2),
            exit(Delete, 2),
        ])
        .unwrap();

        let kinds: Vec<_> = tree
            .depth_first()
            .into_iter()
            .map(|id| tree.node(id).unwrap().kind)
            .collect();
        assert_eq!(kinds, vec![Root, Update, Select, Delete]);
    }

    #[test]
    fn test_mismatched_exit_fails_fast() {
        let err = TreeBuilder::build([enter(Update, 1), enter(Select, 1), exit(Update, 1)]).unwrap_err();
        assert!(matches!(err, Error::UnbalancedEvent { line: 1, .. }));
    }

    #[test]
    fn test_exit_without_enter_fails() {
        let err = TreeBuilder::build([exit(Select, 2)]).unwrap_err();
        assert!(matches!(err, Error::UnbalancedEvent { line: 2, .. }));
    }

    #[test]
    fn test_root_cannot_be_entered() {
        assert!(TreeBuilder::build([enter(Root, 1)]).is_err());
    }

    #[test]
    fn test_exit_before_start_rejected() {
        assert!(TreeBuilder::build([enter(Select, 5), exit(Select, 4)]).is_err());
    }

    #[test]
    fn test_finish_with_open_statements_fails() {
        let mut builder = TreeBuilder::new();
        builder.handle(enter(Update, 1)).unwrap();
        builder.handle(enter(Select, 2)).unwrap();
        assert_eq!(builder.open_statements(), 2);

        let err = builder.finish().unwrap_err();
        assert!(matches!(err, Error::UnclosedStatements(2)));
    }

    #[test]
    fn test_empty_stream_yields_bare_root() {
        let tree = TreeBuilder::build(std::iter::empty()).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.root().end_line, 0);
    }

    #[test]
    fn test_artifact_json_shape() {
        let tree = TreeBuilder::build([enter(Delete, 2), exit(Delete, 3)]).unwrap();
        let json = serde_json::to_value(tree.to_artifact()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "type": "ROOT",
                "startLine": 0,
                "endLine": 3,
                "children": [
                    { "type": "DELETE", "startLine": 2, "endLine": 3, "children": [] }
                ]
            })
        );
    }

    #[test]
    fn test_artifact_statement_count() {
        let tree = TreeBuilder::build([
            enter(Update, 1),
            enter(Select, 1),
            exit(Select, 1),
            exit(Update, 1),
        ])
        .unwrap();
        assert_eq!(tree.to_artifact().statement_count(), 2);
    }
}
