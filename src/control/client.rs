//! Client for sending commands to a running agent

use anyhow::{Context, Result};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Duration;

use super::protocol::Command;

const CLIENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Send one command and return the response line without its newline
pub fn send_command(socket_path: &Path, command: Command) -> Result<String> {
    let stream = UnixStream::connect(socket_path)
        .with_context(|| format!("Failed to connect to socket: {}", socket_path.display()))?;

    stream
        .set_write_timeout(Some(CLIENT_TIMEOUT))
        .context("Failed to set write timeout")?;
    stream
        .set_read_timeout(Some(CLIENT_TIMEOUT))
        .context("Failed to set read timeout")?;

    exchange(&stream, command.as_str())
}

fn exchange(mut stream: &UnixStream, request: &str) -> Result<String> {
    stream
        .write_all(format!("{}\n", request).as_bytes())
        .context("Failed to write command")?;
    stream.flush().context("Failed to flush stream")?;

    let mut line = String::new();
    BufReader::new(stream)
        .read_line(&mut line)
        .context("Failed to read response")?;

    if line.is_empty() {
        anyhow::bail!("Agent closed the connection without responding");
    }

    Ok(line.trim_end_matches('\n').to_string())
}
