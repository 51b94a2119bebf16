use crate::ingest::{LineSource, trim_line_ending};
use async_trait::async_trait;
use std::io;
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};

/// Reads standard input until EOF.
pub struct StdinSource {
    reader: BufReader<Stdin>,
}

impl StdinSource {
    pub fn new() -> Self {
        Self {
            reader: BufReader::new(tokio::io::stdin()),
        }
    }
}

impl Default for StdinSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LineSource for StdinSource {
    async fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = Vec::new();
        if self.reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(None);
        }
        Ok(Some(trim_line_ending(
            String::from_utf8_lossy(&buf).into_owned(),
        )))
    }
}
