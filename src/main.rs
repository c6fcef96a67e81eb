//! manu - manage manufacturing nodes from the terminal

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = manu_node_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
