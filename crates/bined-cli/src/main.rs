#![forbid(unsafe_code)]

use clap::Parser;

fn main() {
    let cli = bined_cli::cli::Cli::parse();
    let json = cli.json;
    bined_cli::init_tracing(cli.log_json);
    if let Err(error) = bined_cli::cli::run(cli) {
        if json {
            eprintln!(
                "{}",
                serde_json::json!({
                    "status": "error",
                    "error": error.to_string(),
                    "exit_code": error.exit_code(),
                })
            );
        } else {
            eprintln!("{error}");
        }
        std::process::exit(error.exit_code());
    }
}
