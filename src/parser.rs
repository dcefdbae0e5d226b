use crate::error::Error;
use crate::sanitize::{is_number, parse_number};
use crate::table::OperandKind;

// ----------------------------------------------------------------------------
// Statement

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Label(String),
    Code(Code),
}

impl Stmt {
    /// Parse one cleaned source line. A line may carry a label, an
    /// instruction, or a label followed by an instruction, so this returns
    /// up to two statements. Blank lines yield none.
    pub fn parse(line: &str) -> Result<Vec<Stmt>, Error> {
        let mut stmts = vec![];
        let mut rest = line;

        // main: ...
        if let Some((head, tail)) = rest.split_once(':') {
            if is_ident(head) {
                stmts.push(Stmt::Label(head.to_string()));
                rest = tail.trim_start();
            }
        }

        if !rest.is_empty() {
            stmts.push(Stmt::Code(Code::parse(rest)?));
        }
        Ok(stmts)
    }
}

// ----------------------------------------------------------------------------
// Instruction

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code {
    pub name: String,
    pub kind: OperandKind,
    pub operand: Operand,
    /// Cleaned source text, kept for the object file annotation column
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    None,
    /// Literal value from `#n` or `@n`
    Value(u8),
    /// `@label`, resolved in pass two
    Label(String),
}

impl Code {
    fn parse(code: &str) -> Result<Code, Error> {
        let mut tokens = code.split(' ');
        let name = match tokens.next() {
            Some(name) if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphabetic()) => {
                name
            }
            _ => return Err(Error::SyntaxError(code.to_string())),
        };

        let (kind, operand) = match tokens.next() {
            None => (OperandKind::None, Operand::None),
            Some(arg) => {
                if let Some(value) = arg.strip_prefix('#') {
                    (OperandKind::Imm, Operand::Value(parse_number(value)?))
                } else if let Some(value) = arg.strip_prefix('@') {
                    if starts_numeric(value) {
                        (OperandKind::Abs, Operand::Value(parse_number(value)?))
                    } else if is_ident(value) {
                        (OperandKind::Abs, Operand::Label(value.to_string()))
                    } else {
                        return Err(Error::SyntaxError(code.to_string()));
                    }
                } else {
                    return Err(Error::SyntaxError(code.to_string()));
                }
            }
        };

        // One operand at most
        if tokens.next().is_some() {
            return Err(Error::SyntaxError(code.to_string()));
        }

        Ok(Code {
            name: name.to_string(),
            kind,
            operand,
            text: code.to_string(),
        })
    }
}

fn is_ident(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_')
}

// A digit-led `@` operand must be a well-formed numeric literal; it never
// falls back to a label name.
fn starts_numeric(s: &str) -> bool {
    is_number(s) || s.starts_with(|c: char| c.is_ascii_digit())
}
