use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unknown opcode: {0}")]
    UnknownOpcode(String),

    #[error("Missing operand for {0}")]
    MissingOperand(String),

    #[error("Invalid operand {operand:?} for {mnemonic}")]
    InvalidOperand { mnemonic: String, operand: String },

    #[error("Operand of {mnemonic} at position {position} does not match its opcode")]
    OperandMismatch {
        position: usize,
        mnemonic: &'static str,
    },

    #[error("Label {0} is referenced but never placed")]
    UndefinedLabel(String),

    #[error("Label {0} is placed more than once")]
    DuplicateLabel(String),

    #[error("Invalid member reference {0:?}, expected owner.name")]
    InvalidMemberRef(String),

    #[error("Invalid listing: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, Error>;
