//! Line sources feeding the pipeline.

mod follow;
mod stdin;

pub use follow::FileFollower;
pub use stdin::StdinSource;

use async_trait::async_trait;
use std::io;
use tokio::sync::mpsc;

/// Something that yields raw log lines in arrival order.
#[async_trait]
pub trait LineSource: Send {
    /// Next complete line without its terminator, or `None` once the source is exhausted.
    async fn next_line(&mut self) -> io::Result<Option<String>>;
}

/// Lines pushed by another task; exhausted when every sender is dropped.
#[async_trait]
impl LineSource for mpsc::Receiver<String> {
    async fn next_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.recv().await)
    }
}

pub(crate) fn trim_line_ending(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}
