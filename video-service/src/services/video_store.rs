//! Lookup of rendered videos.
//!
//! Files are written by the orchestrator, never by this service. The store
//! remembers which file each issued `video_id` refers to and otherwise falls
//! back to the `<output_dir>/<id>.mp4` naming convention.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::path::{Path, PathBuf};

const MAX_VIDEO_ID_LEN: usize = 128;

#[derive(Debug, Clone)]
pub struct VideoRecord {
    pub video_path: PathBuf,
    pub created_at: DateTime<Utc>,
}

pub struct VideoStore {
    output_dir: PathBuf,
    catalog: DashMap<String, VideoRecord>,
    capacity: usize,
}

impl VideoStore {
    pub fn new(output_dir: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            output_dir: output_dir.into(),
            catalog: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Identifiers are restricted to `[A-Za-z0-9_-]` so they can never
    /// escape the output directory.
    pub fn is_valid_id(video_id: &str) -> bool {
        !video_id.is_empty()
            && video_id.len() <= MAX_VIDEO_ID_LEN
            && video_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    /// Conventional location of `video_id`.
    pub fn conventional_path(&self, video_id: &str) -> PathBuf {
        self.output_dir.join(format!("{}.mp4", video_id))
    }

    /// Remember that `video_id` refers to `video_path`.
    ///
    /// When full, the oldest entry is dropped; that id then resolves through
    /// the naming convention only.
    pub fn register(&self, video_id: &str, video_path: impl Into<PathBuf>) {
        if self.catalog.len() >= self.capacity && !self.catalog.contains_key(video_id) {
            self.evict_oldest();
        }

        self.catalog.insert(
            video_id.to_string(),
            VideoRecord {
                video_path: video_path.into(),
                created_at: Utc::now(),
            },
        );
    }

    pub fn record(&self, video_id: &str) -> Option<VideoRecord> {
        self.catalog.get(video_id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// Path of an existing video file for `video_id`, if any.
    pub async fn locate(&self, video_id: &str) -> Option<PathBuf> {
        if !Self::is_valid_id(video_id) {
            return None;
        }

        let candidate = self
            .record(video_id)
            .map(|record| record.video_path)
            .unwrap_or_else(|| self.conventional_path(video_id));

        match tokio::fs::metadata(&candidate).await {
            Ok(meta) if meta.is_file() => Some(candidate),
            _ => None,
        }
    }

    fn evict_oldest(&self) {
        let oldest = self
            .catalog
            .iter()
            .min_by_key(|entry| entry.value().created_at)
            .map(|entry| entry.key().clone());

        if let Some(key) = oldest {
            self.catalog.remove(&key);
            tracing::debug!(video_id = %key, "Evicted oldest catalog entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use uuid::Uuid;

    #[test]
    fn rejects_ids_that_could_traverse() {
        assert!(VideoStore::is_valid_id("abc-123_DEF"));
        assert!(!VideoStore::is_valid_id(""));
        assert!(!VideoStore::is_valid_id(".."));
        assert!(!VideoStore::is_valid_id("a/b"));
        assert!(!VideoStore::is_valid_id("a.mp4"));
        assert!(!VideoStore::is_valid_id(&"x".repeat(MAX_VIDEO_ID_LEN + 1)));
    }

    #[tokio::test]
    async fn locates_file_by_naming_convention() {
        let dir = tempdir().unwrap();
        let store = VideoStore::new(dir.path(), 10);
        tokio::fs::write(dir.path().join("abc.mp4"), b"mp4").await.unwrap();

        assert_eq!(store.locate("abc").await, Some(dir.path().join("abc.mp4")));
        assert_eq!(store.locate("missing").await, None);
    }

    #[tokio::test]
    async fn registered_id_resolves_to_orchestrator_file() {
        let dir = tempdir().unwrap();
        let store = VideoStore::new(dir.path(), 10);
        let rendered = dir.path().join("render-7.mp4");
        tokio::fs::write(&rendered, b"mp4").await.unwrap();

        let video_id = Uuid::new_v4().to_string();
        store.register(&video_id, &rendered);

        assert_eq!(store.locate(&video_id).await, Some(rendered));
    }

    #[tokio::test]
    async fn directories_are_not_videos() {
        let dir = tempdir().unwrap();
        tokio::fs::create_dir_all(dir.path().join("folder.mp4")).await.unwrap();
        let store = VideoStore::new(dir.path(), 10);

        assert_eq!(store.locate("folder").await, None);
    }

    #[tokio::test]
    async fn registered_id_with_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let store = VideoStore::new(dir.path(), 10);
        store.register("issued", dir.path().join("never-rendered.mp4"));

        assert!(store.record("issued").is_some());
        assert_eq!(store.locate("issued").await, None);
    }

    #[test]
    fn catalog_is_bounded() {
        let store = VideoStore::new("output", 2);
        store.register("a", "output/a.mp4");
        std::thread::sleep(std::time::Duration::from_millis(2));
        store.register("b", "output/b.mp4");
        std::thread::sleep(std::time::Duration::from_millis(2));
        store.register("c", "output/c.mp4");

        assert_eq!(store.len(), 2);
        assert!(store.record("a").is_none());
        assert!(store.record("b").is_some());
        assert!(store.record("c").is_some());
    }

    #[test]
    fn re_registering_does_not_evict() {
        let store = VideoStore::new("output", 1);
        store.register("a", "output/a.mp4");
        store.register("a", "output/a2.mp4");

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.record("a").unwrap().video_path,
            PathBuf::from("output/a2.mp4")
        );
    }
}
