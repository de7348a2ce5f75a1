use std::path::{Path, PathBuf};

use tokio::{fs, io::AsyncReadExt};
use tracing::debug;

use crate::{
    error::Result,
    types::{Transcript, TranscriptFile},
};

/// Where transcript text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptSource {
    /// `.json` files are read as Whisper output, anything else as plain text.
    File(PathBuf),
    Stdin,
}

impl TranscriptSource {
    /// `-` means stdin.
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            TranscriptSource::Stdin
        } else {
            TranscriptSource::File(PathBuf::from(arg))
        }
    }

    pub async fn load(&self) -> Result<Transcript> {
        let transcript = match self {
            TranscriptSource::File(path) if is_json(path) => {
                let content = fs::read_to_string(path).await?;
                let file: TranscriptFile = serde_json::from_str(&content)?;
                debug!(
                    path = %path.display(),
                    segments = file.segments.len(),
                    language = file.language.as_deref().unwrap_or("unknown"),
                    "loaded whisper transcript"
                );
                Transcript::new(file.text)
            }
            TranscriptSource::File(path) => Transcript::new(fs::read_to_string(path).await?),
            TranscriptSource::Stdin => {
                let mut text = String::new();
                tokio::io::stdin().read_to_string(&mut text).await?;
                Transcript::new(text)
            }
        };
        Ok(transcript)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
