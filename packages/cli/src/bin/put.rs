use clap::Parser;

use configuration_cli::PutArgs;

fn main() {
    let args = PutArgs::parse();
    configuration_cli::init_logging(args.common.verbose);

    if let Err(e) = configuration_cli::put(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
