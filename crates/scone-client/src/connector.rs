#[cfg(unix)]
use std::path::Path;

use scone_frame::{LineReader, SentenceWriter};
use scone_transport::{SconeStream, TcpTransport};
#[cfg(unix)]
use scone_transport::UnixTransport;
use tracing::debug;

use crate::client::SconeClient;
use crate::config::ClientConfig;
use crate::error::Result;

/// Connect to a server over TCP with default configuration.
pub fn connect(host: &str, port: u16) -> Result<SconeClient> {
    connect_with_config(host, port, &ClientConfig::default())
}

/// Connect over TCP with explicit configuration.
pub fn connect_with_config(host: &str, port: u16, config: &ClientConfig) -> Result<SconeClient> {
    let stream = match config.connect_timeout {
        Some(timeout) => TcpTransport::connect_timeout(host, port, timeout)?,
        None => TcpTransport::connect(host, port)?,
    };
    from_stream(stream, config)
}

/// Connect to a server listening on a Unix domain socket.
#[cfg(unix)]
pub fn connect_unix(path: impl AsRef<Path>, config: &ClientConfig) -> Result<SconeClient> {
    let stream = UnixTransport::connect(path)?;
    from_stream(stream, config)
}

/// Wrap an already connected stream.
///
/// The stream is cloned so reads and writes use independent handles; the
/// configured deadlines are applied to both.
pub fn from_stream(stream: SconeStream, config: &ClientConfig) -> Result<SconeClient> {
    let reader_stream = stream.try_clone()?;
    let reader = LineReader::with_config_stream(reader_stream, config.frame.clone())?;
    let writer = SentenceWriter::with_config_stream(stream, config.frame.clone())?;

    let client = SconeClient::from_parts(reader, writer, config.clone());
    debug!(peer = %client.peer_label(), "connected");
    Ok(client)
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::error::ClientError;

    #[test]
    fn connect_and_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut writer = stream;
            writer.write_all(b"\n[PROMPT]\n").unwrap();
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            writer.write_all(b"{Marta}\n").unwrap();
            line
        });

        let mut client = connect("127.0.0.1", port).unwrap();
        assert!(client.peer_label().starts_with("127.0.0.1:"));
        assert_eq!(
            client.sentence("(new-indv {Marta} {elephant})").unwrap(),
            "{Marta}"
        );
        assert_eq!(server.join().unwrap(), "(new-indv {Marta} {elephant})\n");
        client.close().unwrap();
    }

    #[test]
    fn connect_refused_is_transport_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let err = connect("127.0.0.1", port).unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn read_deadline_surfaces_as_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        // Accept but never write a prompt.
        let server = thread::spawn(move || listener.accept().map(|(stream, _)| stream));

        let mut config = ClientConfig::default();
        config.frame.read_timeout = Some(Duration::from_millis(100));
        let mut client = connect_with_config("127.0.0.1", port, &config).unwrap();

        let err = client.query("(is-x-a-y? {bird} {animal})").unwrap_err();
        assert!(
            matches!(err, ClientError::Frame(scone_frame::FrameError::TimedOut)),
            "unexpected error: {err:?}"
        );
        drop(server.join().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn connect_over_unix_socket() {
        use std::os::unix::net::UnixListener;

        let dir = std::env::temp_dir().join(format!("scone-client-uds-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("scone.sock");
        let _ = std::fs::remove_file(&path);
        let listener = UnixListener::bind(&path).unwrap();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut writer = stream;
            writer.write_all(b"[PROMPT]\n").unwrap();
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            writer.write_all(b"MAYBE\n").unwrap();
        });

        let mut client = connect_unix(&path, &ClientConfig::default()).unwrap();
        assert_eq!(
            client.predicate("(is-x-a-y? {broom} {air transport})").unwrap(),
            "MAYBE"
        );
        server.join().unwrap();
        let _ = std::fs::remove_dir_all(&dir);
    }
}
