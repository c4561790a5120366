use std::fmt;

bitflags::bitflags! {
    /// Classification of an opcode's behavior.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpcodeFlags: u8 {
        /// Reads a local variable slot.
        const LOAD = 1 << 0;
        /// Writes a local variable slot.
        const STORE = 1 << 1;
        /// Transfers control to a label.
        const JUMP = 1 << 2;
        /// Jump that may fall through.
        const CONDITIONAL = 1 << 3;
        /// Calls a method.
        const INVOKE = 1 << 4;
        /// Raises the exception on top of the stack.
        const THROW = 1 << 5;
        /// Returns from the method.
        const RETURN = 1 << 6;
    }
}

/// Shape of the operand an opcode carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandKind {
    None,
    Var,
    Jump,
    Method,
    Type,
}

macro_rules! opcodes {
    ($($name:ident = $value:literal, $mnemonic:literal, $kind:ident, $flags:expr;)*) => {
        /// JVM opcodes understood by the instruction model.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum Opcode {
            $($name = $value,)*
        }

        impl Opcode {
            /// Every opcode, in numeric order.
            pub const ALL: &'static [Opcode] = &[$(Opcode::$name,)*];

            /// Lowercase JVM mnemonic.
            pub fn mnemonic(self) -> &'static str {
                match self {
                    $(Opcode::$name => $mnemonic,)*
                }
            }

            /// Look up an opcode by its mnemonic.
            pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
                match mnemonic {
                    $($mnemonic => Some(Opcode::$name),)*
                    _ => None,
                }
            }

            pub fn operand_kind(self) -> OperandKind {
                match self {
                    $(Opcode::$name => OperandKind::$kind,)*
                }
            }

            pub fn flags(self) -> OpcodeFlags {
                match self {
                    $(Opcode::$name => $flags,)*
                }
            }
        }
    };
}

opcodes! {
    Nop = 0x00, "nop", None, OpcodeFlags::empty();
    AconstNull = 0x01, "aconst_null", None, OpcodeFlags::empty();
    Iconst0 = 0x03, "iconst_0", None, OpcodeFlags::empty();
    Iconst1 = 0x04, "iconst_1", None, OpcodeFlags::empty();
    Iload = 0x15, "iload", Var, OpcodeFlags::LOAD;
    Aload = 0x19, "aload", Var, OpcodeFlags::LOAD;
    Istore = 0x36, "istore", Var, OpcodeFlags::STORE;
    Astore = 0x3a, "astore", Var, OpcodeFlags::STORE;
    Pop = 0x57, "pop", None, OpcodeFlags::empty();
    Dup = 0x59, "dup", None, OpcodeFlags::empty();
    Ifeq = 0x99, "ifeq", Jump, OpcodeFlags::JUMP | OpcodeFlags::CONDITIONAL;
    Ifne = 0x9a, "ifne", Jump, OpcodeFlags::JUMP | OpcodeFlags::CONDITIONAL;
    IfAcmpeq = 0xa5, "if_acmpeq", Jump, OpcodeFlags::JUMP | OpcodeFlags::CONDITIONAL;
    IfAcmpne = 0xa6, "if_acmpne", Jump, OpcodeFlags::JUMP | OpcodeFlags::CONDITIONAL;
    Goto = 0xa7, "goto", Jump, OpcodeFlags::JUMP;
    Ireturn = 0xac, "ireturn", None, OpcodeFlags::RETURN;
    Areturn = 0xb0, "areturn", None, OpcodeFlags::RETURN;
    Return = 0xb1, "return", None, OpcodeFlags::RETURN;
    Invokevirtual = 0xb6, "invokevirtual", Method, OpcodeFlags::INVOKE;
    Invokespecial = 0xb7, "invokespecial", Method, OpcodeFlags::INVOKE;
    Invokestatic = 0xb8, "invokestatic", Method, OpcodeFlags::INVOKE;
    Invokeinterface = 0xb9, "invokeinterface", Method, OpcodeFlags::INVOKE;
    New = 0xbb, "new", Type, OpcodeFlags::empty();
    Athrow = 0xbf, "athrow", None, OpcodeFlags::THROW;
    Ifnull = 0xc6, "ifnull", Jump, OpcodeFlags::JUMP | OpcodeFlags::CONDITIONAL;
    Ifnonnull = 0xc7, "ifnonnull", Jump, OpcodeFlags::JUMP | OpcodeFlags::CONDITIONAL;
}

impl Opcode {
    pub fn is_unconditional_jump(self) -> bool {
        let flags = self.flags();
        flags.contains(OpcodeFlags::JUMP) && !flags.contains(OpcodeFlags::CONDITIONAL)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Identity of a label within one method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LabelId(pub u32);

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// A symbolic reference to a method: declaring type, name and descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodRef {
    /// Internal name of the declaring type, e.g. `java/lang/Throwable`.
    pub owner: String,
    pub name: String,
    /// Method descriptor, e.g. `()V`.
    pub desc: String,
}

impl MethodRef {
    pub fn new(owner: &str, name: &str, desc: &str) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
            desc: desc.to_string(),
        }
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} {}", self.owner, self.name, self.desc)
    }
}

/// Operand of an instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    None,
    /// Local variable slot.
    Var(u16),
    /// Jump target.
    Jump(LabelId),
    Method(MethodRef),
    /// Internal type name.
    Type(String),
}

impl Operand {
    pub fn kind(&self) -> OperandKind {
        match self {
            Operand::None => OperandKind::None,
            Operand::Var(_) => OperandKind::Var,
            Operand::Jump(_) => OperandKind::Jump,
            Operand::Method(_) => OperandKind::Method,
            Operand::Type(_) => OperandKind::Type,
        }
    }
}

/// A single instruction with its operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operand: Operand,
}

impl Instruction {
    pub fn new(opcode: Opcode, operand: Operand) -> Self {
        Self { opcode, operand }
    }

    /// Local variable slot of a load or store.
    pub fn var(&self) -> Option<u16> {
        match self.operand {
            Operand::Var(slot) => Some(slot),
            _ => None,
        }
    }

    pub fn jump_target(&self) -> Option<LabelId> {
        match self.operand {
            Operand::Jump(label) => Some(label),
            _ => None,
        }
    }

    pub fn method(&self) -> Option<&MethodRef> {
        match &self.operand {
            Operand::Method(m) => Some(m),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.operand {
            Operand::None => write!(f, "{}", self.opcode),
            Operand::Var(slot) => write!(f, "{} {slot}", self.opcode),
            Operand::Jump(label) => write!(f, "{} {label}", self.opcode),
            Operand::Method(m) => write!(f, "{} {m}", self.opcode),
            Operand::Type(ty) => write!(f, "{} {ty}", self.opcode),
        }
    }
}
