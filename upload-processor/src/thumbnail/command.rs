use std::io;
use std::process::Stdio;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::{ThumbnailError, ThumbnailGenerator, ThumbnailResult};

/// Generator that pipes the image through an external program
///
/// The image is written to the program's stdin and the thumbnail read from its stdout. A
/// non-zero exit or any error output fails the generation.
#[derive(Debug, Clone)]
pub struct CommandThumbnailer {
    program: String,
    args: Vec<String>,
}

impl CommandThumbnailer {
    /// Runs `program` with `args` for every image
    #[must_use]
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// ImageMagick `convert - -thumbnail x<height> -`
    #[must_use]
    pub fn imagemagick(height: u32) -> Self {
        Self::new(
            "convert",
            [
                "-".to_string(),
                "-thumbnail".to_string(),
                format!("x{height}"),
                "-".to_string(),
            ],
        )
    }
}

#[async_trait]
impl ThumbnailGenerator for CommandThumbnailer {
    async fn generate(&self, source: Bytes) -> ThumbnailResult<Bytes> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ThumbnailError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            ThumbnailError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "generator stdin was not captured",
            ))
        })?;

        // stdin is dropped when the feed completes so the program sees EOF
        let feed = async move {
            stdin.write_all(&source).await?;
            stdin.shutdown().await
        };

        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output?;
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            return Err(ThumbnailError::Exit {
                status: output.status.to_string(),
                stderr,
            });
        }

        if !stderr.is_empty() {
            return Err(ThumbnailError::ErrorOutput(stderr));
        }

        fed?;

        debug!(
            program = %self.program,
            "Generated thumbnail of {} bytes",
            output.stdout.len()
        );

        Ok(Bytes::from(output.stdout))
    }
}
