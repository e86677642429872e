use clap::Parser;
use rusty_timesheet::cli::run;
use rusty_timesheet::cli::Cli;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
