use clap::Parser;
use contract_ledger::cli;
use contract_ledger::logging::{self, Verbosity};
use contract_ledger::LedgerConfig;

fn main() {
    let cli_args = cli::Cli::parse();
    logging::init(Verbosity::from_flags(cli_args.verbose, cli_args.quiet));

    let compact = cli_args.compact || cli_args.quiet;
    let config = match LedgerConfig::from_args(cli_args.settings) {
        Ok(config) => config,
        Err(error) => emit_error_and_exit(error),
    };

    match cli::run_command(cli_args.command, &config) {
        Ok(payload) => {
            if let Err(error) = cli::output::emit_value(&payload, compact) {
                emit_error_and_exit(error);
            }
        }
        Err(error) => emit_error_and_exit(error),
    }
}

fn emit_error_and_exit(error: anyhow::Error) -> ! {
    let envelope = cli::errors::envelope_for(&error);
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    if serde_json::to_writer(&mut handle, &envelope).is_err() {
        eprintln!("{{\"code\":\"COMMAND_FAILED\",\"message\":\"{}\"}}", error);
    } else {
        use std::io::Write;
        let _ = handle.write_all(b"\n");
    }
    std::process::exit(1)
}
