use crate::cmd::{Connection, SentenceArgs};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_reply, Mode, OutputFormat};

/// Which exchange path a single sentence takes.
#[derive(Clone, Copy, Debug)]
pub enum Kind {
    Query,
    Sentence,
    Predicate,
}

impl Kind {
    fn mode(self) -> Mode {
        match self {
            Kind::Query => Mode::Query,
            Kind::Sentence => Mode::Sentence,
            Kind::Predicate => Mode::Predicate,
        }
    }
}

pub fn run(
    kind: Kind,
    args: SentenceArgs,
    connection: &Connection,
    format: OutputFormat,
) -> CliResult<i32> {
    let mut client = connection.open()?;

    let result = match kind {
        Kind::Query => client.query(&args.sentence),
        Kind::Sentence => client.sentence(&args.sentence),
        Kind::Predicate => client.predicate(&args.sentence),
    };
    let reply = result.map_err(|err| client_error("request failed", err))?;

    print_reply(kind.mode(), args.sentence.trim(), &reply, format);
    Ok(SUCCESS)
}
