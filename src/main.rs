use clap::Parser;
use canopy::cli::commands::Cli;
use canopy::cli::handlers;
use canopy::io::storage;

fn main() {
    let cli = Cli::parse();

    match cli.command {
        None => {
            // No subcommand → launch TUI
            let data_dir = storage::resolve_data_dir(cli.data_dir.as_deref());
            if let Err(e) = canopy::tui::run(&data_dir) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
        Some(_) => {
            if let Err(e) = handlers::dispatch(cli) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
