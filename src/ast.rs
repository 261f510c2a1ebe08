//! Parsed behavior tree.
//!
//! Nodes live in an arena owned by [`TaskTree`] and refer to one another by [`NodeId`].
//! Ownership runs from a parent to its `children` and from a task to its `guards`; the
//! `parent` field is a plain index kept for walking upwards.

use std::collections::VecDeque;
use std::fmt;

use indexmap::IndexMap;
use serde::ser::{SerializeSeq, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};

use crate::syntax::Token;

/// Attribute name to value, in declaration order.
pub type Attributes = IndexMap<String, String>;

/// Import alias to class path, in declaration order.
pub type ImportMap = IndexMap<String, String>;

/// Index of a node inside its [`TaskTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

/// A task line: a built-in node kind, an import alias, or an unresolved name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskNode {
    pub name: String,
    pub attributes: Attributes,
    pub guards: Vec<NodeId>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    /// Identifier token the task was parsed from.
    pub token: Token,
}

impl TaskNode {
    pub fn new(token: Token) -> Self {
        Self {
            name: token.text().to_string(),
            attributes: Attributes::new(),
            guards: Vec::new(),
            children: Vec::new(),
            parent: None,
            token,
        }
    }

    pub fn line(&self) -> usize {
        self.token.line
    }

    pub fn column(&self) -> usize {
        self.token.column
    }
}

/// Arena of task nodes with an optional root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskTree {
    nodes: Vec<TaskNode>,
    root: Option<NodeId>,
}

impl TaskTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn root_node(&self) -> Option<&TaskNode> {
        self.root.map(|id| self.node(id))
    }

    /// Number of nodes, guards included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Panics if `id` was not issued by this tree.
    pub fn node(&self, id: NodeId) -> &TaskNode {
        &self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &TaskNode> + '_ {
        self.node(id).children.iter().map(|&child| self.node(child))
    }

    pub fn guards(&self, id: NodeId) -> impl Iterator<Item = &TaskNode> + '_ {
        self.node(id).guards.iter().map(|&guard| self.node(guard))
    }

    pub fn parent(&self, id: NodeId) -> Option<&TaskNode> {
        self.node(id).parent.map(|parent| self.node(parent))
    }

    /// Every reachable node, tasks and guards alike, in breadth-first order. Each node is
    /// yielded exactly once.
    pub fn breadth_first(&self) -> BreadthFirst<'_> {
        BreadthFirst {
            tree: self,
            queue: self.root.into_iter().collect(),
        }
    }

    /// First node in breadth-first order with the given name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.breadth_first().find(|&id| self.node(id).name == name)
    }

    /// Serializable nested view rooted at `id`.
    pub fn view(&self, id: NodeId) -> NodeView<'_> {
        NodeView { tree: self, id }
    }

    // ------------------------------------------------------------------------
    // Construction (parser only)
    // ------------------------------------------------------------------------

    pub(crate) fn alloc(&mut self, node: TaskNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub(crate) fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    pub(crate) fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    pub(crate) fn attach_guard(&mut self, owner: NodeId, guard: NodeId) {
        self.nodes[guard.0].parent = Some(owner);
        self.nodes[owner.0].guards.push(guard);
    }

    fn write_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId, depth: usize) -> fmt::Result {
        let node = self.node(id);
        for _ in 0..depth {
            f.write_str("\t")?;
        }
        for guard in self.guards(id) {
            f.write_str("(")?;
            write_task(f, guard)?;
            f.write_str(") ")?;
        }
        write_task(f, node)?;
        writeln!(f)?;
        for &child in &node.children {
            self.write_node(f, child, depth + 1)?;
        }
        Ok(())
    }
}

fn write_task(f: &mut fmt::Formatter<'_>, node: &TaskNode) -> fmt::Result {
    f.write_str(&node.name)?;
    for (key, value) in &node.attributes {
        write!(f, " {}:\"{}\"", key, value)?;
    }
    Ok(())
}

/// Renders the tree back as tab-indented source.
impl fmt::Display for TaskTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root {
            Some(root) => self.write_node(f, root, 0),
            None => Ok(()),
        }
    }
}

/// Breadth-first walk over tasks and their guards.
pub struct BreadthFirst<'a> {
    tree: &'a TaskTree,
    queue: VecDeque<NodeId>,
}

impl Iterator for BreadthFirst<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.queue.pop_front()?;
        let node = self.tree.node(id);
        self.queue.extend(node.guards.iter().copied());
        self.queue.extend(node.children.iter().copied());
        Some(id)
    }
}

// ============================================================================
// SERIALIZATION
// ============================================================================

/// Nested, serializable view of one node and everything below it.
pub struct NodeView<'a> {
    tree: &'a TaskTree,
    id: NodeId,
}

struct NodeList<'a> {
    tree: &'a TaskTree,
    ids: &'a [NodeId],
}

impl Serialize for NodeView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let node = self.tree.node(self.id);
        let mut state = serializer.serialize_struct("TaskNode", 6)?;
        state.serialize_field("name", &node.name)?;
        state.serialize_field("line", &node.line())?;
        state.serialize_field("column", &node.column())?;
        state.serialize_field("attributes", &node.attributes)?;
        state.serialize_field(
            "guards",
            &NodeList {
                tree: self.tree,
                ids: &node.guards,
            },
        )?;
        state.serialize_field(
            "children",
            &NodeList {
                tree: self.tree,
                ids: &node.children,
            },
        )?;
        state.end()
    }
}

impl Serialize for NodeList<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.ids.len()))?;
        for &id in self.ids {
            seq.serialize_element(&self.tree.view(id))?;
        }
        seq.end()
    }
}

impl Serialize for TaskTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("TaskTree", 1)?;
        state.serialize_field("root", &self.root.map(|id| self.view(id)))?;
        state.end()
    }
}
