//! YAML method listings.
//!
//! ```yaml
//! methods:
//!   - name: run
//!     desc: "()V"
//!     code:
//!       - "start:"
//!       - "line 4"
//!       - "aload 1"
//!       - "ifnull done"
//!       - "aload 1"
//!       - "invokevirtual java/io/Reader.close ()V"
//!       - "done:"
//!       - "return"
//!     try_catch:
//!       - { start: start, end: done, handler: done, type: java/lang/Throwable }
//! ```
//!
//! Each code line is a label definition (`name:`), a `line N` or `frame`
//! marker, or a mnemonic followed by its operand.

use std::path::Path;

use serde::Deserialize;

use crate::builder::MethodBuilder;
use crate::error::{Error, Result};
use crate::insn::{Opcode, OperandKind};
use crate::method::MethodNode;

/// A listing document.
#[derive(Debug, Clone, Deserialize)]
pub struct Listing {
    pub methods: Vec<MethodListing>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MethodListing {
    pub name: String,
    #[serde(default = "default_desc")]
    pub desc: String,
    pub code: Vec<String>,
    #[serde(default)]
    pub try_catch: Vec<TryCatchListing>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TryCatchListing {
    pub start: String,
    pub end: String,
    pub handler: String,
    #[serde(rename = "type", default)]
    pub catch_type: Option<String>,
}

fn default_desc() -> String {
    "()V".to_string()
}

/// Parse every method of a listing document.
pub fn parse(text: &str) -> Result<Vec<MethodNode>> {
    let listing: Listing = serde_yaml::from_str(text)?;
    listing.methods.iter().map(MethodListing::to_method).collect()
}

/// Read and parse a listing file.
pub fn open(path: &Path) -> Result<Vec<MethodNode>> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::Io(e.to_string()))?;
    parse(&text)
}

impl MethodListing {
    pub fn to_method(&self) -> Result<MethodNode> {
        let mut b = MethodBuilder::new(&self.name, &self.desc);
        for line in &self.code {
            parse_line(&mut b, line)?;
        }
        for tc in &self.try_catch {
            b.try_catch(&tc.start, &tc.end, &tc.handler, tc.catch_type.as_deref());
        }
        b.build()
    }
}

fn parse_line(b: &mut MethodBuilder, line: &str) -> Result<()> {
    let line = line.trim();
    if let Some(name) = line.strip_suffix(':') {
        b.place(name.trim());
        return Ok(());
    }

    let mut parts = line.split_whitespace();
    let Some(mnemonic) = parts.next() else {
        return Ok(());
    };
    match mnemonic {
        "line" => {
            b.line(number(mnemonic, parts.next())?);
        }
        "frame" => {
            b.frame();
        }
        _ => {
            let opcode = Opcode::from_mnemonic(mnemonic)
                .ok_or_else(|| Error::UnknownOpcode(mnemonic.to_string()))?;
            match opcode.operand_kind() {
                OperandKind::None => b.insn(opcode),
                OperandKind::Var => b.var(opcode, number(mnemonic, parts.next())?),
                OperandKind::Jump => b.jump(opcode, required(mnemonic, parts.next())?),
                OperandKind::Type => b.type_insn(opcode, required(mnemonic, parts.next())?),
                OperandKind::Method => {
                    let target = required(mnemonic, parts.next())?;
                    let desc = required(mnemonic, parts.next())?;
                    let (owner, name) = target
                        .rsplit_once('.')
                        .ok_or_else(|| Error::InvalidMemberRef(target.to_string()))?;
                    b.invoke(opcode, owner, name, desc)
                }
            };
        }
    }

    if let Some(extra) = parts.next() {
        return Err(Error::InvalidOperand {
            mnemonic: mnemonic.to_string(),
            operand: extra.to_string(),
        });
    }
    Ok(())
}

fn required<'a>(mnemonic: &str, token: Option<&'a str>) -> Result<&'a str> {
    token.ok_or_else(|| Error::MissingOperand(mnemonic.to_string()))
}

fn number<T: std::str::FromStr>(mnemonic: &str, token: Option<&str>) -> Result<T> {
    let token = required(mnemonic, token)?;
    token.parse().map_err(|_| Error::InvalidOperand {
        mnemonic: mnemonic.to_string(),
        operand: token.to_string(),
    })
}
