use crate::ingest::{LineSource, trim_line_ending};
use async_trait::async_trait;
use std::fs::Metadata;
use std::io::{self, SeekFrom};
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncSeekExt, BufReader};
use tracing::{debug, info};

/// Follows a growing file, the way `tail -F` does.
///
/// At end of file it sleeps for `poll_interval` and then checks the path: a file
/// that shrank is read again from the start, a file that was replaced (new inode)
/// is reopened. Bytes after the last newline are held back until the line is
/// complete.
///
/// A copy-truncate that regrows past the old offset within one poll is caught
/// when the byte before the offset is no longer the newline that ended the last
/// line. Regrown content that happens to put a newline there is not detected.
pub struct FileFollower {
    path: PathBuf,
    reader: BufReader<File>,
    position: u64,
    inode: Option<u64>,
    partial: Vec<u8>,
    /// `position` sits right after a newline this follower read itself.
    at_line_start: bool,
    poll_interval: Duration,
}

impl FileFollower {
    /// Open `path`. Unless `from_start` is set, existing contents are skipped.
    pub async fn open(
        path: impl Into<PathBuf>,
        from_start: bool,
        poll_interval: Duration,
    ) -> io::Result<Self> {
        let path = path.into();
        let mut file = File::open(&path).await?;
        let inode = inode_of(&file.metadata().await?);

        let position = if from_start {
            0
        } else {
            file.seek(SeekFrom::End(0)).await?
        };

        info!(path = %path.display(), position, "following log file");

        Ok(Self {
            path,
            reader: BufReader::new(file),
            position,
            inode,
            partial: Vec::new(),
            // Skipping to the end may land mid-line.
            at_line_start: position == 0,
            poll_interval,
        })
    }

    /// After new data arrived, check that the byte before `position` is still
    /// the newline this follower last consumed.
    async fn still_on_line_boundary(&mut self, len: u64) -> io::Result<bool> {
        if !self.at_line_start || self.position == 0 || len <= self.position {
            return Ok(true);
        }

        self.reader.seek(SeekFrom::Start(self.position - 1)).await?;
        let mut byte = [0u8; 1];
        match self.reader.read_exact(&mut byte).await {
            Ok(_) => Ok(byte[0] == b'\n'),
            // Shrank again since the metadata call.
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn restart_from_top(&mut self, why: &'static str) -> io::Result<()> {
        self.reader.seek(SeekFrom::Start(0)).await?;
        self.position = 0;
        self.partial.clear();
        self.at_line_start = true;
        info!(path = %self.path.display(), why, "reading log file from start");
        Ok(())
    }

    async fn check_rotation(&mut self) -> io::Result<()> {
        let meta = match tokio::fs::metadata(&self.path).await {
            Ok(meta) => meta,
            // Between rename and re-create; try again next poll.
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };

        if inode_of(&meta) != self.inode {
            let file = File::open(&self.path).await?;
            self.inode = inode_of(&file.metadata().await?);
            self.reader = BufReader::new(file);
            self.position = 0;
            self.partial.clear();
            self.at_line_start = true;
            info!(path = %self.path.display(), "log file rotated; reopened");
        } else if meta.len() < self.position {
            self.restart_from_top("truncated").await?;
        } else if !self.still_on_line_boundary(meta.len()).await? {
            self.restart_from_top("truncated and regrown").await?;
        }

        Ok(())
    }
}

#[async_trait]
impl LineSource for FileFollower {
    async fn next_line(&mut self) -> io::Result<Option<String>> {
        loop {
            let n = self.reader.read_until(b'\n', &mut self.partial).await?;

            if n == 0 {
                tokio::time::sleep(self.poll_interval).await;
                self.check_rotation().await?;
                continue;
            }

            self.position += n as u64;
            self.at_line_start = false;

            if self.partial.last() == Some(&b'\n') {
                self.at_line_start = true;
                let raw = std::mem::take(&mut self.partial);
                return Ok(Some(trim_line_ending(
                    String::from_utf8_lossy(&raw).into_owned(),
                )));
            }

            debug!(buffered = self.partial.len(), "partial line; waiting for the rest");
        }
    }
}

#[cfg(unix)]
fn inode_of(meta: &Metadata) -> Option<u64> {
    use std::os::unix::fs::MetadataExt;
    Some(meta.ino())
}

#[cfg(not(unix))]
fn inode_of(_meta: &Metadata) -> Option<u64> {
    None
}
