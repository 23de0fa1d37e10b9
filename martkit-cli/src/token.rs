//! File-backed session token persistence.

use async_trait::async_trait;
use compact_str::CompactString;
use std::io::ErrorKind;
use std::path::PathBuf;

use martkit_core::session::TokenStore;

/// Keeps the bearer token in a plain file between CLI invocations.
///
/// Storage failures are logged and swallowed; a lost token only means the
/// next protected command asks for a fresh login.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn get(&self) -> Option<CompactString> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                let token = content.trim();
                (!token.is_empty()).then(|| CompactString::from(token))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "could not read token file");
                None
            }
        }
    }

    async fn set(&self, token: &str) {
        if let Err(err) = tokio::fs::write(&self.path, token).await {
            tracing::warn!(path = %self.path.display(), error = %err, "could not write token file");
        }
    }

    async fn clear(&self) {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "could not remove token file");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_and_clear() {
        let dir = std::env::temp_dir().join("martkit-token-test");
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let store = FileTokenStore::new(dir.join("token"));

        assert!(store.get().await.is_none());
        store.set("tok-123").await;
        assert_eq!(store.get().await.as_deref(), Some("tok-123"));
        store.clear().await;
        assert!(store.get().await.is_none());
        // Clearing twice is fine.
        store.clear().await;
    }
}
