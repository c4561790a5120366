//! Instruction model for JVM method bodies.
//!
//! A method is an ordered [`InsnList`] of nodes (instructions plus label,
//! line and frame markers) together with its try-catch table. Methods are
//! produced by a class-file decoder, by [`MethodBuilder`], or from a YAML
//! [`listing`].

pub mod builder;
pub mod error;
pub mod insn;
pub mod list;
pub mod listing;
pub mod method;

pub use builder::MethodBuilder;
pub use error::{Error, Result};
pub use insn::{Instruction, LabelId, MethodRef, Opcode, OpcodeFlags, Operand, OperandKind};
pub use list::{InsnId, InsnList, Node, NodeKind};
pub use method::{MethodNode, THROWABLE, TryCatchBlock};
