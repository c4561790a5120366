use std::collections::HashMap;

use crate::insn::{LabelId, Operand};
use crate::list::{InsnId, InsnList, Node};

/// Internal name of the root throwable type.
pub const THROWABLE: &str = "java/lang/Throwable";

/// An entry of a method's exception table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TryCatchBlock {
    /// Start of the protected region (inclusive).
    pub start: LabelId,
    /// End of the protected region (exclusive).
    pub end: LabelId,
    /// Entry point of the handler.
    pub handler: LabelId,
    /// Caught type, `None` catches anything.
    pub catch_type: Option<String>,
}

/// A method body together with its exception table.
#[derive(Debug, Clone)]
pub struct MethodNode {
    pub name: String,
    pub desc: String,
    pub insns: InsnList,
    pub try_catch_blocks: Vec<TryCatchBlock>,
    labels: HashMap<LabelId, InsnId>,
    label_names: HashMap<LabelId, String>,
}

impl MethodNode {
    pub fn new(
        name: &str,
        desc: &str,
        insns: InsnList,
        try_catch_blocks: Vec<TryCatchBlock>,
    ) -> Self {
        let labels = insns
            .iter()
            .filter_map(|(id, node)| match node {
                Node::Label(label) => Some((*label, id)),
                _ => None,
            })
            .collect();
        Self {
            name: name.to_string(),
            desc: desc.to_string(),
            insns,
            try_catch_blocks,
            labels,
            label_names: HashMap::new(),
        }
    }

    pub(crate) fn with_label_names(mut self, names: HashMap<LabelId, String>) -> Self {
        self.label_names = names;
        self
    }

    /// Position of the node that defines `label`.
    pub fn label_position(&self, label: LabelId) -> Option<InsnId> {
        self.labels.get(&label).copied()
    }

    /// Position of the handler entry label of `block`.
    pub fn handler_entry(&self, block: &TryCatchBlock) -> Option<InsnId> {
        self.label_position(block.handler)
    }

    /// Symbolic name of a label, falling back to `L<n>`.
    pub fn label_name(&self, label: LabelId) -> String {
        self.label_names
            .get(&label)
            .cloned()
            .unwrap_or_else(|| label.to_string())
    }

    /// Render a node using symbolic label names.
    pub fn render_node(&self, id: InsnId) -> String {
        match &self.insns[id] {
            Node::Label(label) => format!("{}:", self.label_name(*label)),
            Node::Insn(insn) => match insn.operand {
                Operand::Jump(target) => format!("{} {}", insn.opcode, self.label_name(target)),
                _ => insn.to_string(),
            },
            node => node.to_string(),
        }
    }
}
