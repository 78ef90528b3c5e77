use clap::Parser;

use configuration_cli::{GetArgs, EXIT_NOT_FOUND};

fn main() {
    let args = GetArgs::parse();
    configuration_cli::init_logging(args.common.verbose);

    let mut stdout = std::io::stdout().lock();
    match configuration_cli::get(&args, &mut stdout) {
        Ok(true) => {}
        Ok(false) => std::process::exit(EXIT_NOT_FOUND),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
