use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "rfid-blocks",
    about = "Generate RFID library code from a block program."
)]
pub struct Args {
    #[arg(
        value_name = "INPUT",
        required_unless_present = "definitions",
        help = "Program JSON: an array of {\"kind\", \"list_name\"} blocks in execution order."
    )]
    pub input: Option<PathBuf>,

    #[arg(value_name = "OUTPUT", help = "Write the result here instead of stdout.")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Print the editor block definitions as JSON instead of generating code. A single path argument is used as the output file.")]
    pub definitions: bool,

    #[arg(
        long,
        help = "Append top-level expression blocks after the source as '# expr: ' lines."
    )]
    pub print_expressions: bool,
}
