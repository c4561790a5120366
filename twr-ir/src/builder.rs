//! Method builder with symbolic labels.

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::insn::{Instruction, LabelId, MethodRef, Opcode, Operand};
use crate::list::{InsnId, InsnList, Node};
use crate::method::{MethodNode, TryCatchBlock};

/// Assembles a [`MethodNode`] node by node.
///
/// Labels are referred to by name and may be used before they are placed.
/// Emitting methods chain; the first error encountered is reported by
/// [`build`](Self::build).
#[derive(Debug)]
pub struct MethodBuilder {
    name: String,
    desc: String,
    insns: InsnList,
    labels: HashMap<String, LabelId>,
    placed: HashSet<LabelId>,
    try_catch_blocks: Vec<TryCatchBlock>,
    error: Option<Error>,
}

impl MethodBuilder {
    pub fn new(name: &str, desc: &str) -> Self {
        Self {
            name: name.to_string(),
            desc: desc.to_string(),
            insns: InsnList::new(),
            labels: HashMap::new(),
            placed: HashSet::new(),
            try_catch_blocks: Vec::new(),
            error: None,
        }
    }

    /// Identity of the label called `name`, allocating it on first use.
    pub fn label(&mut self, name: &str) -> LabelId {
        let next = LabelId(self.labels.len() as u32);
        *self.labels.entry(name.to_string()).or_insert(next)
    }

    /// Position the next emitted node will take.
    pub fn next_id(&self) -> InsnId {
        InsnId(self.insns.len())
    }

    /// Position of the most recently emitted node.
    pub fn last_id(&self) -> InsnId {
        InsnId(self.insns.len().saturating_sub(1))
    }

    /// Emit the definition of label `name`.
    pub fn place(&mut self, name: &str) -> &mut Self {
        let label = self.label(name);
        if !self.placed.insert(label) {
            self.fail(Error::DuplicateLabel(name.to_string()));
        }
        self.insns.push(Node::Label(label));
        self
    }

    pub fn line(&mut self, line: u32) -> &mut Self {
        self.insns.push(Node::Line(line));
        self
    }

    pub fn frame(&mut self) -> &mut Self {
        self.insns.push(Node::Frame);
        self
    }

    /// Emit an instruction without operand.
    pub fn insn(&mut self, opcode: Opcode) -> &mut Self {
        self.push(opcode, Operand::None)
    }

    pub fn var(&mut self, opcode: Opcode, slot: u16) -> &mut Self {
        self.push(opcode, Operand::Var(slot))
    }

    pub fn jump(&mut self, opcode: Opcode, target: &str) -> &mut Self {
        let label = self.label(target);
        self.push(opcode, Operand::Jump(label))
    }

    pub fn invoke(&mut self, opcode: Opcode, owner: &str, name: &str, desc: &str) -> &mut Self {
        self.push(opcode, Operand::Method(MethodRef::new(owner, name, desc)))
    }

    pub fn type_insn(&mut self, opcode: Opcode, ty: &str) -> &mut Self {
        self.push(opcode, Operand::Type(ty.to_string()))
    }

    /// Add an exception table entry; `catch_type` of `None` catches anything.
    pub fn try_catch(
        &mut self,
        start: &str,
        end: &str,
        handler: &str,
        catch_type: Option<&str>,
    ) -> &mut Self {
        let block = TryCatchBlock {
            start: self.label(start),
            end: self.label(end),
            handler: self.label(handler),
            catch_type: catch_type.map(str::to_string),
        };
        self.try_catch_blocks.push(block);
        self
    }

    /// Finish the method, checking labels and operands.
    pub fn build(self) -> Result<MethodNode> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let mut names = HashMap::with_capacity(self.labels.len());
        for (name, label) in self.labels {
            if !self.placed.contains(&label) {
                return Err(Error::UndefinedLabel(name));
            }
            names.insert(label, name);
        }
        for (id, node) in self.insns.iter() {
            if let Node::Insn(insn) = node {
                if insn.opcode.operand_kind() != insn.operand.kind() {
                    return Err(Error::OperandMismatch {
                        position: id.0,
                        mnemonic: insn.opcode.mnemonic(),
                    });
                }
            }
        }
        Ok(MethodNode::new(&self.name, &self.desc, self.insns, self.try_catch_blocks)
            .with_label_names(names))
    }

    fn push(&mut self, opcode: Opcode, operand: Operand) -> &mut Self {
        self.insns.push(Node::Insn(Instruction::new(opcode, operand)));
        self
    }

    fn fail(&mut self, err: Error) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}
