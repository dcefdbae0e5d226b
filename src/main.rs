use clap::Parser;
use color_print::cprintln;
use jasm::{object_path, Cell, Diag, Error, MnemonicTable, Program};

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Input source file
    #[clap(default_value = "main.jasm")]
    input: String,

    /// Instruction table definition
    #[clap(short, long, default_value = "instructions.h")]
    table: String,

    /// Output file (defaults to the input with a .jexe extension)
    #[clap(short, long)]
    output: Option<String>,

    /// Dump the resolved stream to stdout
    #[clap(short, long)]
    dump: bool,
}

fn main() {
    let args = Args::parse();
    println!("J8 Assembler");

    println!("1. Load Mnemonic Table");
    println!("  < {}", args.table);
    let table_src = read(&args.table);
    let table = match MnemonicTable::parse(&table_src) {
        Ok(table) => table,
        Err(diag) => abort(diag, &args.table, &table_src),
    };

    println!("2. Assemble");
    println!("  < {}", args.input);
    let source = read(&args.input);
    let program = match Program::assemble(&table, &source) {
        Ok(program) => program,
        Err(diag) => abort(diag, &args.input, &source),
    };

    println!("3. Emit");
    let output = args.output.unwrap_or_else(|| object_path(&args.input));
    if let Err(diag) = program.write(&output) {
        abort(diag, &args.input, &source);
    }
    println!("  > {}", output);

    if args.dump {
        for (addr, cell) in program.cells.iter().enumerate() {
            match cell {
                Cell::Op { text, opcode } => {
                    cprintln!("<green>{:08b}</>: {:08b} <red>{}</>", addr, opcode, text)
                }
                Cell::Value(v) => cprintln!("<green>{:08b}</>: {:08b}", addr, v),
            }
        }
        for (name, addr) in program.labels.iter() {
            cprintln!("<cyan>{}</> = {:08b}", name, addr);
        }
    }
}

fn read(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => abort(Diag::new(Error::FileOpen(path.to_string(), e)), path, ""),
    }
}

fn abort(diag: Diag, path: &str, source: &str) -> ! {
    diag.print(path, source);
    std::process::exit(1)
}
