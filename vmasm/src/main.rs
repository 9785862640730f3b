use clap::Parser;
use color_print::cprintln;
use std::path::Path;

use vmasm::error::AsmError;

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(version, about = "Assembler for the VM ISA", help_template = HELP_TEMPLATE)]
struct Args {
    #[clap(subcommand)]
    cmd: Cmd,
}

#[derive(Debug, clap::Subcommand)]
enum Cmd {
    /// Assemble a source file into a relocatable object
    Assemble {
        /// Input source file
        input: String,

        /// Output object file (defaults to the input with a .vmo extension)
        #[clap(short, long)]
        output: Option<String>,
    },
    /// Hex-dump any toolchain file
    Dump {
        /// File to dump
        file: String,
    },
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        cprintln!("<red,bold>error</>: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), AsmError> {
    match args.cmd {
        Cmd::Assemble { input, output } => {
            let src = std::fs::read_to_string(&input)
                .map_err(|e| AsmError::FileOpen(input.clone(), e))?;
            let obj = vmasm::assemble(&input, &src)?;
            let blob = obj.to_bytes();

            let out = output.unwrap_or_else(|| {
                Path::new(&input)
                    .with_extension("vmo")
                    .to_string_lossy()
                    .into_owned()
            });
            std::fs::write(&out, &blob).map_err(|e| AsmError::FileWrite(out.clone(), e))?;
            println!("Wrote {} ({} bytes)", out, blob.len());
        }
        Cmd::Dump { file } => {
            let bytes = std::fs::read(&file).map_err(|e| AsmError::FileOpen(file.clone(), e))?;
            print!("{}", vmasm::dump::hexdump(&bytes));
        }
    }
    Ok(())
}
