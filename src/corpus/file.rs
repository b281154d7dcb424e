use super::CorpusRepository;
use crate::model::Message;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum CorpusFileError {
    #[error("corpus file I/O failed for {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("corpus file {} is not valid JSON", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Flat JSON file holding the whole corpus.
///
/// Clones share one writer lock, so snapshots taken through
/// [`CorpusFile::persist`] reach the disk in the order they were taken.
#[derive(Debug, Clone)]
pub struct CorpusFile {
    path: PathBuf,
    writer: Arc<Mutex<()>>,
}

impl CorpusFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// Reads all stored messages. A missing file is an empty corpus.
    pub fn load(&self) -> Result<Vec<Message>, CorpusFileError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Corpus file {} not found, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(CorpusFileError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let messages: Vec<Message> =
            serde_json::from_str(&content).map_err(|source| CorpusFileError::Json {
                path: self.path.clone(),
                source,
            })?;
        info!("Loaded {} stored messages from {}", messages.len(), self.path.display());
        Ok(messages)
    }

    /// Like `load`, but a corrupt or unreadable file yields an empty corpus.
    pub fn load_or_empty(&self) -> Vec<Message> {
        self.load().unwrap_or_else(|e| {
            warn!("Ignoring stored corpus: {}", e);
            Vec::new()
        })
    }

    /// Writes to a temporary file, then renames it into place.
    pub fn save(&self, messages: &[&Message]) -> Result<(), CorpusFileError> {
        let io_err = |source: io::Error| CorpusFileError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(messages).map_err(|source| CorpusFileError::Json {
            path: self.path.clone(),
            source,
        })?;
        let tmp = self.path.with_extension(format!(
            "json.{}.{}.tmp",
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&tmp, json).map_err(io_err)?;
        if let Err(source) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(io_err(source));
        }
        debug!("Saved {} messages to {}", messages.len(), self.path.display());
        Ok(())
    }

    /// Snapshots `corpus` and writes it, holding the writer lock for both
    /// steps. The last call to finish always leaves the newest snapshot.
    pub async fn persist(&self, corpus: &dyn CorpusRepository) -> anyhow::Result<()> {
        let _writer = self.writer.lock().await;
        let snapshot = corpus.scan_all();
        let file = self.clone();
        tokio::task::spawn_blocking(move || {
            let messages: Vec<&Message> = snapshot.iter().map(|m| m.as_ref()).collect();
            file.save(&messages)
        })
        .await??;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::InMemoryCorpus;
    use crate::model::fixtures::{link, message};

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let file = CorpusFile::new(dir.path().join("nested").join("messages.json"));

        let mut first = message(1, "travel", "Portugal Reise Tipps", "2024-05-01 10:00:00");
        first.links.push(link(
            "https://www.visitportugal.com/de",
            "Visit Portugal",
            "Offizielle Seite",
            "www.visitportugal.com",
        ));
        let second = message(2, "general", "Hallo", "2024-05-02 10:00:00");

        file.save(&[&first, &second]).unwrap();
        let loaded = file.load().unwrap();
        assert_eq!(loaded, vec![first, second]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_persist_keeps_newest_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let file = CorpusFile::new(dir.path().join("messages.json"));
        let corpus = Arc::new(InMemoryCorpus::new());

        let mut tasks = Vec::new();
        for id in 0..64 {
            let file = file.clone();
            let corpus = corpus.clone();
            tasks.push(tokio::spawn(async move {
                corpus.append(message(id, "general", "hallo", "2024-05-01 10:00:00"));
                file.persist(corpus.as_ref()).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(file.load().unwrap().len(), 64);
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = CorpusFile::new(dir.path().join("absent.json"));
        assert!(file.load().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.json");
        fs::write(&path, "{ not json").unwrap();
        let file = CorpusFile::new(&path);
        let err = file.load().unwrap_err();
        assert!(matches!(err, CorpusFileError::Json { .. }));
        // the cause is only reachable through source(), not repeated in the message
        assert_eq!(
            err.to_string(),
            format!("corpus file {} is not valid JSON", path.display())
        );
        assert!(std::error::Error::source(&err).is_some());
        assert!(file.load_or_empty().is_empty());
    }
}
