mod image;

use clap::Parser;
use color_print::cprintln;

use image::{Image, LoadError};

#[derive(Debug, clap::Parser)]
#[clap(version, about = "Loader for VM executables")]
struct Args {
    /// Executable to load
    input: String,

    /// Hex-dump the populated memory region after loading
    #[clap(short, long)]
    dump: bool,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        cprintln!("<red,bold>error</>: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), LoadError> {
    let img = Image::load_file(&args.input)?;
    println!(
        "Loaded {} ({} text + {} data bytes). entry=0x{:X}",
        args.input, img.text_size, img.data_size, img.pc
    );
    if args.dump {
        print!("{}", img.dump(0, img.text_size + img.data_size));
    }
    Ok(())
}
