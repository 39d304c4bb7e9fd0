//! Engine log file tailing.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::{debug, instrument};

use xpanel_core::error::{PanelError, Result};
use xpanel_core::traits::LogStore;

/// Read size when scanning the log backwards.
const CHUNK_SIZE: usize = 8 * 1024;

/// Serves the last lines of the engine log file.
///
/// A missing log file reads as empty; the engine may simply not have run yet.
pub struct FileLogStore {
    path: PathBuf,
}

impl FileLogStore {
    /// Creates a store reading `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LogStore for FileLogStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn read_logs(&self, count: usize) -> Result<Vec<String>> {
        match tail_lines(&self.path, count, CHUNK_SIZE).await {
            Ok(lines) => {
                debug!(lines = lines.len(), "read log tail");
                Ok(lines)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(PanelError::StorageError(format!(
                "failed to read log {}: {e}",
                self.path.display()
            ))),
        }
    }
}

/// Returns the last `count` lines of the file, reading it backwards in
/// `chunk`-sized blocks so large logs are never loaded whole.
async fn tail_lines(path: &Path, count: usize, chunk: usize) -> std::io::Result<Vec<String>> {
    if count == 0 {
        return Ok(Vec::new());
    }

    let mut file = fs::File::open(path).await?;
    let buf = read_tail(&mut file, count, chunk).await?;

    let text = String::from_utf8_lossy(&buf);
    let lines: Vec<&str> = text.lines().collect();
    let skip = lines.len().saturating_sub(count);
    Ok(lines[skip..].iter().map(|l| l.to_string()).collect())
}

/// Reads blocks from the end of `file` until they hold `count` complete lines
/// or the start of the file is reached. Each block is scanned once.
async fn read_tail(file: &mut fs::File, count: usize, chunk: usize) -> std::io::Result<Vec<u8>> {
    let mut pos = file.metadata().await?.len();
    let mut blocks: Vec<Vec<u8>> = Vec::new();
    let mut newlines = 0usize;

    while pos > 0 {
        let step = (chunk as u64).min(pos);
        pos -= step;
        file.seek(SeekFrom::Start(pos)).await?;

        let mut block = vec![0u8; step as usize];
        file.read_exact(&mut block).await?;

        newlines += block.iter().filter(|b| **b == b'\n').count();
        // A trailing newline terminates the last line rather than starting a new one.
        if blocks.is_empty() && block.last() == Some(&b'\n') {
            newlines -= 1;
        }
        blocks.push(block);

        if newlines >= count {
            break;
        }
    }

    blocks.reverse();
    Ok(blocks.concat())
}
