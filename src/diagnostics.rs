//! Diagnostics sinks used by the CLI

use std::path::{Path, PathBuf};

use action_flow::{AttachmentKind, DiagnosticsError, DiagnosticsSink};
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

const MAX_NAME_LEN: usize = 120;

/// Writes every attachment as a file into one directory
#[derive(Debug, Clone)]
pub struct ArtifactDirSink {
    dir: PathBuf,
}

impl ArtifactDirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<timestamp>_<name>.<ext>` with unsafe characters replaced
    pub fn file_name(name: &str, kind: AttachmentKind) -> String {
        format!(
            "{}_{}.{}",
            Utc::now().format("%Y%m%dT%H%M%S%.3f"),
            sanitize(name),
            kind.extension()
        )
    }
}

fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_NAME_LEN)
        .collect();
    if cleaned.is_empty() {
        "attachment".to_string()
    } else {
        cleaned
    }
}

#[async_trait]
impl DiagnosticsSink for ArtifactDirSink {
    async fn attach(
        &self,
        name: &str,
        payload: &[u8],
        kind: AttachmentKind,
    ) -> Result<(), DiagnosticsError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(Self::file_name(name, kind));
        tokio::fs::write(&path, payload).await?;
        debug!(path = %path.display(), %kind, "Diagnostic written");
        Ok(())
    }
}

/// Logs attachments instead of storing them
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

#[async_trait]
impl DiagnosticsSink for TracingSink {
    async fn attach(
        &self,
        name: &str,
        payload: &[u8],
        kind: AttachmentKind,
    ) -> Result<(), DiagnosticsError> {
        match kind {
            AttachmentKind::Text => {
                info!(attachment = name, content = %String::from_utf8_lossy(payload), "Diagnostic")
            }
            AttachmentKind::Image => {
                info!(attachment = name, bytes = payload.len(), "Diagnostic image")
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_file_name() {
        let name = ArtifactDirSink::file_name(
            "Clicking element id:userName_Attempt_1_Failure",
            AttachmentKind::Image,
        );
        assert!(name.ends_with("_Clicking_element_id_userName_Attempt_1_Failure.png"));
        assert!(!name.contains(' '));
    }

    #[tokio::test]
    async fn test_artifact_dir_sink_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ArtifactDirSink::new(dir.path().join("diagnostics"));
        sink.attach("Failure Reason", b"timeout: slow", AttachmentKind::Text)
            .await
            .unwrap();

        let entries: Vec<_> = std::fs::read_dir(sink.dir())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].ends_with("_Failure_Reason.txt"));
    }
}
