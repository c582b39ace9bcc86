//! Interactive console front end.
//!
//! The stand-in for a chat gateway: reads one command per line from
//! stdin, hands it to the relay, and renders the outcome back to the
//! user. Parsing raw text into tokens and reporting errors verbatim is
//! exactly the contract a chat collaborator would fulfill.

use std::time::Duration;

use tokio::io::{self, AsyncBufReadExt, BufReader};
use warden_rcon::Dialer;
use warden_relay::{Command, RelayService};

/// Relays stdin lines until EOF.
pub async fn run<D: Dialer>(
    service: &RelayService<D>,
    command_timeout: Duration,
) -> io::Result<()> {
    let mut lines = BufReader::new(io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let Some(command) = Command::parse(&line) else {
            continue; // blank line
        };

        let handle = service.submit(command, command_timeout).await;
        match handle.result().await {
            Ok(output) if output.is_empty() => println!("(no output)"),
            Ok(output) => println!("{output}"),
            Err(err) => println!("error: {err}"),
        }
    }

    Ok(())
}
