use std::fs;
use std::path::PathBuf;

use smarttrace_protocol::Track;

/// Single-slot store for the last search result list.
///
/// The slot keeps serialized JSON rather than parsed tracks, so a corrupt
/// entry (hand-edited session file, older format) simply reads back as a miss.
/// When a session file is configured every write is mirrored there and a cold
/// slot falls back to it. After [`clear`](Self::clear) the file is ignored
/// until the next `put`, even if it could not be removed.
#[derive(Debug, Default)]
pub struct ResultCache {
    slot: Option<String>,
    session_file: Option<PathBuf>,
    cleared: bool,
}

impl ResultCache {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn with_session_file(path: PathBuf) -> Self {
        Self {
            slot: None,
            session_file: Some(path),
            cleared: false,
        }
    }

    pub fn put(&mut self, results: &[Track]) {
        let encoded = match serde_json::to_string(results) {
            Ok(encoded) => encoded,
            Err(err) => {
                tracing::warn!("failed to encode search results for cache: {err}");
                return;
            }
        };
        if let Some(path) = &self.session_file {
            let written = path
                .parent()
                .map_or(Ok(()), fs::create_dir_all)
                .and_then(|()| fs::write(path, &encoded));
            if let Err(err) = written {
                tracing::warn!(path = %path.display(), "failed to mirror result cache: {err}");
            }
        }
        tracing::debug!(count = results.len(), "cached search results");
        self.slot = Some(encoded);
        self.cleared = false;
    }

    /// The cached list, or `None` when absent or unreadable.
    pub fn get(&self) -> Option<Vec<Track>> {
        let raw = match &self.slot {
            Some(raw) => raw.clone(),
            None if self.cleared => return None,
            None => self.read_session_file()?,
        };
        match serde_json::from_str(&raw) {
            Ok(results) => Some(results),
            Err(err) => {
                tracing::debug!("ignoring unparseable result cache: {err}");
                None
            }
        }
    }

    pub fn clear(&mut self) {
        self.slot = None;
        self.cleared = true;
        if let Some(path) = &self.session_file
            && let Err(err) = fs::remove_file(path)
            && err.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %path.display(), "failed to remove result cache: {err}");
            if let Err(err) = fs::write(path, "[]") {
                tracing::warn!(path = %path.display(), "failed to blank result cache: {err}");
            }
        }
    }

    /// Cached list for optimistic restore; empty lists are not worth showing.
    pub fn restore(&self) -> Option<Vec<Track>> {
        self.get().filter(|results| !results.is_empty())
    }

    fn read_session_file(&self) -> Option<String> {
        let path = self.session_file.as_ref()?;
        match fs::read_to_string(path) {
            Ok(raw) => Some(raw),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                tracing::debug!(path = %path.display(), "result cache unreadable: {err}");
                None
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn put_raw(&mut self, raw: &str) {
        self.slot = Some(raw.to_string());
        self.cleared = false;
    }
}
