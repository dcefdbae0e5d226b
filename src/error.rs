use color_print::cprintln;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed table entry: `{0}`")]
    MalformedTableEntry(String),

    #[error("Mnemonic table holds {0} entries, opcodes must fit in one byte")]
    TableTooLarge(usize),

    #[error("Syntax error: cannot parse `{0}`")]
    SyntaxError(String),

    #[error("Unknown instruction: `{0}`")]
    UnknownInstruction(String),

    #[error("Value out of range: `{0}` (expected 0..=255)")]
    ValueOutOfRange(String),

    #[error("Label `{0}` already defined")]
    DuplicateLabel(String),

    #[error("Undefined label: `{0}`")]
    UndefinedLabel(String),

    #[error("Program too large: address {0} does not fit in one byte")]
    ProgramTooLarge(usize),

    #[error("Failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Failed to write file: {0}")]
    FileWrite(String, #[source] std::io::Error),
}

/// An error tied to its source location, as far as one is known.
#[derive(Debug)]
pub struct Diag {
    pub error: Error,
    /// 1-based source line number
    pub line: Option<usize>,
}

impl Diag {
    pub fn new(error: Error) -> Self {
        Diag { error, line: None }
    }

    pub fn at(error: Error, line: usize) -> Self {
        Diag {
            error,
            line: Some(line),
        }
    }

    /// Print the error with file location and offending line content
    pub fn print(&self, path: &str, source: &str) {
        cprintln!("<red,bold>error</>: {}", self.error);
        match self.line {
            Some(no) => {
                cprintln!("     <blue>--></> <underline>{}:{}</>", path, no);
                cprintln!("      <blue>|</>");
                let content = source.lines().nth(no - 1).unwrap_or("");
                cprintln!(" <blue>{:>4} |</> {}", no, content);
                cprintln!("      <blue>|</>");
            }
            None => cprintln!("     <blue>--></> <underline>{}</>", path),
        }
    }
}

impl From<Error> for Diag {
    fn from(error: Error) -> Self {
        Diag::new(error)
    }
}
