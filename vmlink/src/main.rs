use clap::Parser;
use color_print::cprintln;

use vmlink::LinkError;
use vmobj::object::Object;

#[derive(Debug, clap::Parser)]
#[clap(version, about = "Linker for VM object files")]
struct Args {
    /// Output executable
    #[clap(short, long)]
    output: String,

    /// Input object files, linked in the given order
    #[clap(required = true)]
    input: Vec<String>,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        cprintln!("<red,bold>error</>: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), LinkError> {
    let mut objs = Vec::with_capacity(args.input.len());
    for path in &args.input {
        let raw = std::fs::read(path).map_err(|e| LinkError::FileRead(path.clone(), e))?;
        objs.push(Object::parse(path, &raw)?);
    }

    let exe = vmlink::link(&objs)?;
    let blob = exe.to_bytes();
    std::fs::write(&args.output, &blob)
        .map_err(|e| LinkError::FileWrite(args.output.clone(), e))?;
    println!("Wrote {} ({} bytes). entry={}", args.output, blob.len(), exe.entry);
    Ok(())
}
