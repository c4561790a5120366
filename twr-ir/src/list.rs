use std::fmt;
use std::ops::Index;

use crate::insn::{Instruction, LabelId, OpcodeFlags};

/// Position of a node within an [`InsnList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InsnId(pub usize);

impl fmt::Display for InsnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node of a method body: an instruction or a pseudo-instruction marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Jump target / region boundary.
    Label(LabelId),
    /// Source line number marker.
    Line(u32),
    /// Stack map frame marker.
    Frame,
    Insn(Instruction),
}

/// Coarse classification of a [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    LocalLoad,
    LocalStore,
    Jump,
    LabelMarker,
    LineMarker,
    FrameMarker,
    Invoke,
    Throw,
    Other,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Label(_) => NodeKind::LabelMarker,
            Node::Line(_) => NodeKind::LineMarker,
            Node::Frame => NodeKind::FrameMarker,
            Node::Insn(insn) => {
                let flags = insn.opcode.flags();
                if flags.contains(OpcodeFlags::LOAD) {
                    NodeKind::LocalLoad
                } else if flags.contains(OpcodeFlags::STORE) {
                    NodeKind::LocalStore
                } else if flags.contains(OpcodeFlags::JUMP) {
                    NodeKind::Jump
                } else if flags.contains(OpcodeFlags::INVOKE) {
                    NodeKind::Invoke
                } else if flags.contains(OpcodeFlags::THROW) {
                    NodeKind::Throw
                } else {
                    NodeKind::Other
                }
            }
        }
    }

    /// Labels, line numbers and frames do not execute.
    pub fn is_marker(&self) -> bool {
        matches!(
            self.kind(),
            NodeKind::LabelMarker | NodeKind::LineMarker | NodeKind::FrameMarker
        )
    }

    pub fn as_insn(&self) -> Option<&Instruction> {
        match self {
            Node::Insn(insn) => Some(insn),
            _ => None,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Label(label) => write!(f, "{label}:"),
            Node::Line(line) => write!(f, "line {line}"),
            Node::Frame => f.write_str("frame"),
            Node::Insn(insn) => write!(f, "{insn}"),
        }
    }
}

/// Ordered node sequence of one method, traversable in both directions.
///
/// `next` and `prev` return `None` past either end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsnList {
    nodes: Vec<Node>,
}

impl InsnList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node and return its position.
    pub fn push(&mut self, node: Node) -> InsnId {
        self.nodes.push(node);
        InsnId(self.nodes.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: InsnId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn next(&self, id: InsnId) -> Option<InsnId> {
        let next = id.0 + 1;
        (next < self.nodes.len()).then_some(InsnId(next))
    }

    pub fn prev(&self, id: InsnId) -> Option<InsnId> {
        id.0.checked_sub(1).map(InsnId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (InsnId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (InsnId(i), n))
    }
}

impl Index<InsnId> for InsnList {
    type Output = Node;

    fn index(&self, id: InsnId) -> &Node {
        &self.nodes[id.0]
    }
}

impl FromIterator<Node> for InsnList {
    fn from_iter<T: IntoIterator<Item = Node>>(iter: T) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}
