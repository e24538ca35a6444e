mod cmd;
mod exit;
mod logging;
mod output;

use std::path::PathBuf;

use clap::Parser;
use scone_transport::{DEFAULT_HOST, DEFAULT_PORT};

use crate::cmd::{Command, Connection};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "scone", version, about = "Scone knowledge-base client")]
struct Cli {
    /// Server host.
    #[arg(long, env = "SCONE_HOST", default_value = DEFAULT_HOST, global = true)]
    host: String,

    /// Server port.
    #[arg(long, env = "SCONE_PORT", default_value_t = DEFAULT_PORT, global = true)]
    port: u16,

    /// Connect and read/write deadline (e.g. 5s, 500ms).
    #[arg(long, value_name = "DURATION", global = true)]
    timeout: Option<String>,

    /// Load knowledge files from this directory before running the command.
    #[arg(long, value_name = "DIR", global = true)]
    load: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version are not failures.
            let code = if err.use_stderr() {
                exit::USAGE
            } else {
                exit::SUCCESS
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let connection = Connection {
        host: cli.host,
        port: cli.port,
        timeout: cli.timeout,
        load: cli.load,
    };
    let result = cmd::run(cli.command, &connection, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
