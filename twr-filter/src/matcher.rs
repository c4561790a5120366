//! Cursor-based matching over an instruction list.
//!
//! A template is a sequence of `next_is_*` steps. Each step moves the cursor
//! and checks the node it lands on. Symbolic names used by a template are
//! bound to concrete slots, jump targets and declaring types on first sight
//! and must agree on every later occurrence.

use std::collections::HashMap;

use twr_ir::{InsnId, InsnList, Instruction, LabelId, Node, Opcode, THROWABLE};

use crate::output::IgnoredRange;

/// The two spans covered by a recognized statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ranges {
    /// Resource closing on the normal execution path.
    pub normal: IgnoredRange,
    /// Exceptional path starting at the handler.
    pub handler: IgnoredRange,
}

#[derive(Debug, Clone, Default)]
struct Bindings<'a> {
    vars: HashMap<String, u16>,
    labels: HashMap<String, LabelId>,
    owners: HashMap<String, &'a str>,
}

/// Matching state for one method.
///
/// [`start`](Self::start) must be called before every template attempt; it
/// places the cursor at a handler and forgets all bindings.
#[derive(Debug)]
pub struct Matcher<'a> {
    pub(crate) insns: &'a InsnList,
    bindings: Bindings<'a>,
    pub(crate) start: InsnId,
    pub(crate) cursor: Option<InsnId>,
}

/// Bind `name` to `actual`, or check it against the existing binding.
fn unify<T: PartialEq>(table: &mut HashMap<String, T>, name: &str, actual: T) -> bool {
    match table.get(name) {
        Some(expected) => *expected == actual,
        None => {
            table.insert(name.to_string(), actual);
            true
        }
    }
}

impl<'a> Matcher<'a> {
    pub fn new(insns: &'a InsnList) -> Self {
        Self {
            insns,
            bindings: Bindings::default(),
            start: InsnId(0),
            cursor: None,
        }
    }

    /// Reset the state for an attempt at the handler entry `start`.
    pub fn start(&mut self, start: InsnId) {
        self.start = start;
        self.cursor = self.insns.prev(start);
        self.bindings.vars.clear();
        self.bindings.labels.clear();
        self.bindings.owners.clear();
    }

    /// Instruction under the cursor, if the cursor is on one.
    pub(crate) fn insn(&self) -> Option<&'a Instruction> {
        let insns = self.insns;
        self.cursor.and_then(|c| insns.get(c)).and_then(Node::as_insn)
    }

    pub(crate) fn cursor_is(&self, opcode: Opcode) -> bool {
        self.insn().is_some_and(|insn| insn.opcode == opcode)
    }

    pub(crate) fn cursor_is_unconditional_jump(&self) -> bool {
        self.insn().is_some_and(|insn| insn.opcode.is_unconditional_jump())
    }

    /// Move to the next instruction, skipping labels, line numbers and frames.
    pub(crate) fn next(&mut self) {
        let insns = self.insns;
        loop {
            self.cursor = self.cursor.and_then(|c| insns.next(c));
            match self.cursor {
                Some(c) if insns[c].is_marker() => continue,
                _ => break,
            }
        }
    }

    pub(crate) fn next_is(&mut self, opcode: Opcode) -> bool {
        self.next();
        self.cursor_is(opcode)
    }

    pub(crate) fn next_is_var(&mut self, opcode: Opcode, name: &str) -> bool {
        if !self.next_is(opcode) {
            return false;
        }
        match self.insn().and_then(Instruction::var) {
            Some(slot) => unify(&mut self.bindings.vars, name, slot),
            None => false,
        }
    }

    pub(crate) fn next_is_jump(&mut self, opcode: Opcode, name: &str) -> bool {
        if !self.next_is(opcode) {
            return false;
        }
        match self.insn().and_then(Instruction::jump_target) {
            Some(label) => unify(&mut self.bindings.labels, name, label),
            None => false,
        }
    }

    /// Step exactly one node and require the label previously bound to `name`.
    pub(crate) fn next_is_label(&mut self, name: &str) -> bool {
        let insns = self.insns;
        self.cursor = self.cursor.and_then(|c| insns.next(c));
        let Some(Node::Label(actual)) = self.cursor.map(|c| &insns[c]) else {
            return false;
        };
        self.bindings.labels.get(name) == Some(actual)
    }

    /// `name.close()` through a virtual or interface call to `close()V`.
    pub(crate) fn next_is_close(&mut self, name: &str) -> bool {
        if !self.next_is_var(Opcode::Aload, name) {
            return false;
        }
        self.next();
        let Some(insn) = self.insn() else {
            return false;
        };
        if !matches!(insn.opcode, Opcode::Invokevirtual | Opcode::Invokeinterface) {
            return false;
        }
        let Some(m) = insn.method() else {
            return false;
        };
        if m.name != "close" || m.desc != "()V" {
            return false;
        }
        unify(&mut self.bindings.owners, name, m.owner.as_str())
    }

    pub(crate) fn next_is_add_suppressed(&mut self) -> bool {
        if !self.next_is(Opcode::Invokevirtual) {
            return false;
        }
        self.insn()
            .and_then(Instruction::method)
            .is_some_and(|m| {
                m.owner == THROWABLE
                    && m.name == "addSuppressed"
                    && m.desc == "(Ljava/lang/Throwable;)V"
            })
    }

    /// `primaryExc.addSuppressed(name)`.
    pub(crate) fn next_is_add_suppressed_of(&mut self, name: &str) -> bool {
        self.next_is_var(Opcode::Aload, "primaryExc")
            && self.next_is_var(Opcode::Aload, name)
            && self.next_is_add_suppressed()
    }

    /// Run `pattern`, rolling back the cursor and any bindings it made if it
    /// fails.
    pub(crate) fn attempt(&mut self, pattern: impl FnOnce(&mut Self) -> bool) -> bool {
        let cursor = self.cursor;
        let bindings = self.bindings.clone();
        if pattern(self) {
            true
        } else {
            self.cursor = cursor;
            self.bindings = bindings;
            false
        }
    }

    /// Walk backwards from the handler entry until `pattern` matches forward
    /// from the current position.
    ///
    /// Returns the node preceding the matched block with the cursor left on
    /// the block's last instruction, or `None` once the first node is passed.
    pub(crate) fn find_backward(
        &mut self,
        mut pattern: impl FnMut(&mut Self) -> bool,
    ) -> Option<InsnId> {
        let mut c = self.insns.prev(self.start)?;
        loop {
            self.cursor = Some(c);
            if self.attempt(&mut pattern) {
                return Some(c);
            }
            c = self.insns.prev(c)?;
        }
    }

    /// Node following `id`.
    pub(crate) fn after(&self, id: InsnId) -> Option<InsnId> {
        self.insns.next(id)
    }

    #[cfg(test)]
    fn var(&self, name: &str) -> Option<u16> {
        self.bindings.vars.get(name).copied()
    }
}
