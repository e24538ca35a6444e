use std::path::PathBuf;
use std::time::Duration;

use scone_client::{connect_with_config, ClientConfig, SconeClient};
use scone_knowledge::{load_local_knowledge, LoaderConfig};
use tracing::info;

use crate::exit::{client_error, load_error, CliError, CliResult, USAGE};

/// Where and how to reach the server, from global flags.
#[derive(Debug, Clone)]
pub struct Connection {
    pub host: String,
    pub port: u16,
    pub timeout: Option<String>,
    pub load: Option<PathBuf>,
}

impl Connection {
    pub fn client_config(&self) -> CliResult<ClientConfig> {
        let mut config = ClientConfig::default();
        if let Some(raw) = &self.timeout {
            let timeout = parse_duration(raw)?;
            config.connect_timeout = Some(timeout);
            config.frame.read_timeout = Some(timeout);
            config.frame.write_timeout = Some(timeout);
        }
        Ok(config)
    }

    /// Connect, then run `--load` if it was given.
    pub fn open(&self) -> CliResult<SconeClient> {
        let config = self.client_config()?;
        let mut client = connect_with_config(&self.host, self.port, &config)
            .map_err(|err| client_error("connect failed", err))?;
        info!(host = %self.host, port = self.port, "connected");

        if let Some(dir) = &self.load {
            load_local_knowledge(&mut client, dir, &LoaderConfig::default())
                .map_err(|err| load_error("knowledge load failed", err))?;
        }
        Ok(client)
    }
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(match unit {
        "ms" => Duration::from_millis(value),
        _ => Duration::from_secs(value),
    })
}
