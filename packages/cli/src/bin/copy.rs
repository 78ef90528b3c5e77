use clap::Parser;

use configuration_cli::CopyArgs;

fn main() {
    let args = CopyArgs::parse();
    configuration_cli::init_logging(args.common.verbose);

    if let Err(e) = configuration_cli::copy(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
