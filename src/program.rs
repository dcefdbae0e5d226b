use crate::error::{Diag, Error};
use crate::label::Labels;
use crate::parser::{Code, Operand, Stmt};
use crate::sanitize::clean;
use crate::table::MnemonicTable;

// ----------------------------------------------------------------------------
// Cells

/// One byte of the emitted stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// Opcode byte, annotated with the cleaned source text
    Op { text: String, opcode: u8 },
    /// Operand byte
    Value(u8),
}

impl Cell {
    pub fn byte(&self) -> u8 {
        match self {
            Cell::Op { opcode, .. } => *opcode,
            Cell::Value(v) => *v,
        }
    }
}

// Pass-one stream slot. An operand referencing a label stays pending until
// the symbol table is complete; only resolved slots become cells.
#[derive(Debug, Clone)]
enum Slot {
    Op { text: String, opcode: u8 },
    Value(u8),
    Pending(String),
}

// ----------------------------------------------------------------------------
// Program

/// The fully resolved instruction stream of one assembly invocation.
#[derive(Debug)]
pub struct Program {
    pub cells: Vec<Cell>,
    pub labels: Labels,
}

impl Program {
    /// Run both passes over `source`. The first scan binds every label and
    /// emits a provisional stream; the second resolves deferred label
    /// references, so a label may be used before its declaration. The first
    /// error aborts the invocation.
    pub fn assemble(table: &MnemonicTable, source: &str) -> Result<Program, Diag> {
        let mut slots: Vec<Slot> = vec![];
        let mut labels = Labels::new();
        // slot index -> (referenced name, referencing line)
        let mut fixups: Vec<(usize, String, usize)> = vec![];

        // Pass one
        for (idx, raw) in source.lines().enumerate() {
            let no = idx + 1;
            let line = clean(raw);
            for stmt in Stmt::parse(&line).map_err(|e| Diag::at(e, no))? {
                match stmt {
                    Stmt::Label(name) => {
                        if labels.insert(name.clone(), no, slots.len()).is_some() {
                            return Err(Diag::at(Error::DuplicateLabel(name), no));
                        }
                    }
                    Stmt::Code(code) => {
                        encode(table, code, no, &mut slots, &mut fixups)?;
                    }
                }
            }
        }

        if slots.len() > 256 {
            return Err(Diag::new(Error::ProgramTooLarge(slots.len() - 1)));
        }

        // Pass two
        for (slot, name, no) in fixups {
            let addr = labels
                .get(&name)
                .ok_or_else(|| Diag::at(Error::UndefinedLabel(name.clone()), no))?;
            let addr =
                u8::try_from(addr).map_err(|_| Diag::at(Error::ProgramTooLarge(addr), no))?;
            slots[slot] = Slot::Value(addr);
        }

        // Every pending slot has a fixup entry, so none survives pass two
        let cells = slots
            .into_iter()
            .map(|slot| match slot {
                Slot::Op { text, opcode } => Cell::Op { text, opcode },
                Slot::Value(v) => Cell::Value(v),
                Slot::Pending(name) => unreachable!("unresolved fixup for `{}`", name),
            })
            .collect();

        Ok(Program { cells, labels })
    }

    /// Render the object text: one `address: value annotation` line per
    /// cell, all fields as 8-bit binary strings.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (addr, cell) in self.cells.iter().enumerate() {
            match cell {
                Cell::Op { text, opcode } => {
                    out.push_str(&format!("{:08b}: {:08b} {}\n", addr, opcode, text));
                }
                // Same field layout as opcode cells, with an empty
                // annotation; the trailing space stays.
                Cell::Value(v) => {
                    out.push_str(&format!("{:08b}: {:08b} \n", addr, v));
                }
            }
        }
        out
    }

    /// Write the object file in one shot, so a failed assembly never leaves
    /// a partially written file behind.
    pub fn write(&self, path: &str) -> Result<(), Diag> {
        std::fs::write(path, self.render())
            .map_err(|e| Diag::new(Error::FileWrite(path.to_string(), e)))
    }
}

fn encode(
    table: &MnemonicTable,
    code: Code,
    no: usize,
    slots: &mut Vec<Slot>,
    fixups: &mut Vec<(usize, String, usize)>,
) -> Result<(), Diag> {
    let opcode = table
        .opcode(&code.name, code.kind)
        .ok_or_else(|| Diag::at(Error::UnknownInstruction(code.text.clone()), no))?;
    slots.push(Slot::Op {
        text: code.text,
        opcode,
    });
    match code.operand {
        Operand::None => {}
        Operand::Value(v) => slots.push(Slot::Value(v)),
        Operand::Label(name) => {
            slots.push(Slot::Pending(name.clone()));
            fixups.push((slots.len() - 1, name, no));
        }
    }
    Ok(())
}

/// Default object path: the input path with its extension swapped for `jexe`.
pub fn object_path(input: &str) -> String {
    std::path::Path::new(input)
        .with_extension("jexe")
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::OperandKind;

    fn table() -> MnemonicTable {
        let src = ["nop", "load #0", "jmp @0", "halt"]
            .iter()
            .map(|t| format!("Instruction(\"{}\", 2),\n", t))
            .collect::<String>();
        MnemonicTable::parse(&src).unwrap()
    }

    fn assemble(source: &str) -> Result<Program, Diag> {
        Program::assemble(&table(), source)
    }

    #[test]
    fn end_to_end_example() {
        let program = assemble("start: load #5\njmp @end\nend: halt\n").unwrap();
        assert_eq!(program.cells.len(), 5);
        assert_eq!(
            program.cells[0],
            Cell::Op {
                text: "load #5".to_string(),
                opcode: 1
            }
        );
        assert_eq!(program.cells[1], Cell::Value(5));
        assert_eq!(
            program.cells[2],
            Cell::Op {
                text: "jmp @end".to_string(),
                opcode: 2
            }
        );
        assert_eq!(program.cells[3], Cell::Value(3));
        assert_eq!(
            program.cells[4],
            Cell::Op {
                text: "halt".to_string(),
                opcode: 3
            }
        );
        assert_eq!(program.labels.get("start"), Some(0));
        assert_eq!(program.labels.get("end"), Some(3));
    }

    #[test]
    fn opcode_is_table_index() {
        let table = table();
        let program = Program::assemble(&table, "nop\nload #1\njmp @0\nhalt\n").unwrap();
        let opcodes: Vec<u8> = program
            .cells
            .iter()
            .filter_map(|cell| match cell {
                Cell::Op { opcode, .. } => Some(*opcode),
                Cell::Value(_) => None,
            })
            .collect();
        assert_eq!(opcodes, vec![0, 1, 2, 3]);
        assert_eq!(table.opcode("jmp", OperandKind::Abs), Some(2));
    }

    #[test]
    fn forward_reference_resolves() {
        let program = assemble("jmp @end\nnop\nend: halt\n").unwrap();
        // jmp occupies cells 0-1, nop cell 2, halt cell 3
        assert_eq!(program.cells[1], Cell::Value(3));
        assert_eq!(program.labels.get("end"), Some(3));
    }

    #[test]
    fn backward_reference_resolves() {
        let program = assemble("loop: nop\njmp @loop\n").unwrap();
        assert_eq!(program.cells[2], Cell::Value(0));
    }

    #[test]
    fn blank_and_label_lines_consume_no_address() {
        let program = assemble("\na:\n\nb: nop\n\nc:\nnop\n").unwrap();
        assert_eq!(program.cells.len(), 2);
        assert_eq!(program.labels.get("a"), Some(0));
        assert_eq!(program.labels.get("b"), Some(0));
        assert_eq!(program.labels.get("c"), Some(1));
    }

    #[test]
    fn duplicate_label_fails_at_declaration() {
        let diag = assemble("end: nop\nnop\nend: halt\n").unwrap_err();
        assert!(matches!(diag.error, Error::DuplicateLabel(name) if name == "end"));
        assert_eq!(diag.line, Some(3));
    }

    #[test]
    fn undefined_label_fails_after_full_scan() {
        let diag = assemble("jmp @nowhere\nhalt\n").unwrap_err();
        assert!(matches!(diag.error, Error::UndefinedLabel(name) if name == "nowhere"));
        assert_eq!(diag.line, Some(1));

        // A declaration later than the reference must not fail
        assert!(assemble("jmp @later\nlater: halt\n").is_ok());
    }

    #[test]
    fn unknown_instruction_names_line() {
        let diag = assemble("nop\n\nfoo\n").unwrap_err();
        assert!(matches!(&diag.error, Error::UnknownInstruction(text) if text == "foo"));
        assert_eq!(diag.line, Some(3));
    }

    #[test]
    fn operand_shape_is_part_of_the_lookup() {
        // `load` is only declared with an immediate operand
        let diag = assemble("load @0\n").unwrap_err();
        assert!(matches!(diag.error, Error::UnknownInstruction(_)));
        let diag = assemble("load\n").unwrap_err();
        assert!(matches!(diag.error, Error::UnknownInstruction(_)));
    }

    #[test]
    fn immediate_out_of_range_aborts() {
        let diag = assemble("load #300\n").unwrap_err();
        assert!(matches!(diag.error, Error::ValueOutOfRange(_)));
        assert_eq!(diag.line, Some(1));
    }

    #[test]
    fn absolute_numeric_operand_is_emitted_directly() {
        let program = assemble("jmp @0x10\n").unwrap();
        assert_eq!(program.cells[1], Cell::Value(16));
    }

    #[test]
    fn stream_overflow_is_fatal() {
        let source = "nop\n".repeat(300);
        let diag = assemble(&source).unwrap_err();
        assert!(matches!(diag.error, Error::ProgramTooLarge(_)));
    }

    #[test]
    fn render_matches_object_format() {
        let program = assemble("start: load #5\njmp @end\nend: halt\n").unwrap();
        assert_eq!(
            program.render(),
            "00000000: 00000001 load #5\n\
             00000001: 00000101 \n\
             00000010: 00000010 jmp @end\n\
             00000011: 00000011 \n\
             00000100: 00000011 halt\n"
        );
    }

    #[test]
    fn operand_cells_keep_the_annotation_column() {
        // Every cell line carries the space separating the value field from
        // the (possibly empty) annotation column.
        let program = assemble("start: load #5\njmp @end\nend: halt\n").unwrap();
        for line in program.render().lines() {
            let (_, rest) = line.split_once(": ").unwrap();
            assert_eq!(rest.as_bytes().get(8), Some(&b' '), "line: {:?}", line);
        }
    }

    #[test]
    fn emitted_immediate_decodes_back() {
        for v in [0u8, 1, 5, 127, 254, 255] {
            let program = assemble(&format!("load #{}\n", v)).unwrap();
            let rendered = program.render();
            let line = rendered.lines().nth(1).unwrap();
            let (addr, value) = line.split_once(": ").unwrap();
            assert_eq!(u8::from_str_radix(addr, 2).unwrap(), 1);
            assert_eq!(u8::from_str_radix(value.trim_end(), 2).unwrap(), v);
        }
    }

    #[test]
    fn assembly_is_deterministic() {
        let source = "start: load #5\njmp @end\nend: halt\n";
        let a = assemble(source).unwrap().render();
        let b = assemble(source).unwrap().render();
        assert_eq!(a, b);
    }

    #[test]
    fn object_path_swaps_extension() {
        assert_eq!(object_path("prog.jasm"), "prog.jexe");
        assert_eq!(object_path("dir/prog.asm"), "dir/prog.jexe");
        assert_eq!(object_path("prog"), "prog.jexe");
    }
}
