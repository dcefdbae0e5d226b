use crate::error::{Diag, Error};
use crate::sanitize::sanitize;

// ----------------------------------------------------------------------------
// Operand shape

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    None,
    /// `#` immediate value
    Imm,
    /// `@` absolute address or label
    Abs,
}

// ----------------------------------------------------------------------------
// Mnemonic table

/// One instruction signature: a letters-only name plus its operand shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MnemonicEntry {
    pub name: String,
    pub kind: OperandKind,
}

impl MnemonicEntry {
    /// Parse a sanitized signature such as `load #`, `jmp @` or `halt`.
    fn parse(signature: &str) -> Option<MnemonicEntry> {
        let mut tokens = signature.split_whitespace();
        let name = tokens.next()?;
        if !name.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        let kind = match tokens.next() {
            None => OperandKind::None,
            Some("#") => OperandKind::Imm,
            Some("@") => OperandKind::Abs,
            Some(_) => return None,
        };
        if tokens.next().is_some() {
            return None;
        }
        Some(MnemonicEntry {
            name: name.to_string(),
            kind,
        })
    }
}

/// The ordered instruction catalog. An entry's position is its opcode, so
/// declaration order in the table source is load-bearing. Immutable once
/// parsed; owned by the caller and passed by reference into the pipeline.
#[derive(Debug, Clone, Default)]
pub struct MnemonicTable {
    entries: Vec<MnemonicEntry>,
}

impl MnemonicTable {
    /// Parse a table definition. Every non-blank line must be an
    /// `Instruction("<text>" ...)` declaration.
    pub fn parse(source: &str) -> Result<MnemonicTable, Diag> {
        let mut entries = vec![];
        for (idx, raw) in source.lines().enumerate() {
            let no = idx + 1;
            if raw.trim().is_empty() {
                continue;
            }
            let text = extract_decl(raw).ok_or_else(|| {
                Diag::at(Error::MalformedTableEntry(raw.trim().to_string()), no)
            })?;
            let entry = MnemonicEntry::parse(&sanitize(text))
                .ok_or_else(|| Diag::at(Error::MalformedTableEntry(text.to_string()), no))?;
            entries.push(entry);
        }
        if entries.len() > 256 {
            return Err(Diag::new(Error::TableTooLarge(entries.len())));
        }
        Ok(MnemonicTable { entries })
    }

    /// Opcode of the instruction matching `(name, kind)`, if declared.
    pub fn opcode(&self, name: &str, kind: OperandKind) -> Option<u8> {
        self.entries
            .iter()
            .position(|e| e.name == name && e.kind == kind)
            .map(|i| i as u8)
    }

    pub fn get(&self, opcode: u8) -> Option<&MnemonicEntry> {
        self.entries.get(opcode as usize)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Pull `<text>` out of a declaration shaped `Instruction("<text>" ...)`.
fn extract_decl(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix("Instruction(\"")?;
    let end = rest.find('"')?;
    Some(&rest[..end])
}
