mod error;
mod label;
mod parser;
mod program;
mod sanitize;
mod table;

pub use error::{Diag, Error};
pub use label::Labels;
pub use parser::{Code, Operand, Stmt};
pub use program::{object_path, Cell, Program};
pub use sanitize::{clean, parse_number, sanitize};
pub use table::{MnemonicEntry, MnemonicTable, OperandKind};
