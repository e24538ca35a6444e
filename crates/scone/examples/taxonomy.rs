//! Small tour of the client against a running server.
//!
//! Run with:
//!   cargo run --example taxonomy -- localhost 6517

use scone::client::ClientError;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "localhost".to_string());
    let port = match args.next() {
        Some(port) => port.parse()?,
        None => 6517,
    };

    let mut scone = scone::connect(&host, port)?;
    eprintln!("Connected to {}", scone.peer_label());

    println!("{}", scone.sentence("(new-indv {Marta} {elephant})")?);
    println!(
        "Is Marta an animal? {}",
        scone.predicate("(is-x-a-y? {Marta} {animal})")?
    );

    // The second sentence contradicts the taxonomy, so the whole batch is
    // undone and {Lucia} never appears.
    match scone.multi_sentence(&["(new-indv {Lucia} {tiger})", "(new-is-a {Lucia} {bird})"]) {
        Ok(replies) => println!("batch committed: {replies:?}"),
        Err(ClientError::Transaction { sentence, source }) => {
            println!("batch rolled back at {sentence}: {source}")
        }
        Err(err) => return Err(err.into()),
    }

    scone.close()?;
    Ok(())
}
