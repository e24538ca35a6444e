use scone_knowledge::{load_local_knowledge, LoaderConfig};

use crate::cmd::{Connection, LoadArgs};
use crate::exit::{load_error, CliResult, SUCCESS};
use crate::output::{print_load, OutputFormat};

pub fn run(args: LoadArgs, connection: &Connection, format: OutputFormat) -> CliResult<i32> {
    let mut client = connection.open()?;

    let config = LoaderConfig {
        extension: args.extension.trim_start_matches('.').to_string(),
        ..LoaderConfig::default()
    };
    let count = load_local_knowledge(&mut client, &args.dir, &config)
        .map_err(|err| load_error("knowledge load failed", err))?;

    print_load(&args.dir, count, format);
    Ok(SUCCESS)
}
