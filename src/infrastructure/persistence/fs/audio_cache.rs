//! File-based Content-Addressed Audio Cache Implementation
//!
//! 文件布局: `<root>/<volume>/<guid[0..2]>/<guid><suffix>`
//! 文件系统本身即索引，guid → 路径为纯函数

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::fs;

use crate::application::ports::{
    AudioCachePort, CacheError, CacheStats, EphemeralSweep, VolumeInfo, COMMON_VOLUME,
};

/// 签名旁注后缀
const SIGNATURE_SUFFIX: &str = ".json";

/// 文件缓存配置
#[derive(Debug, Clone)]
pub struct FileCacheConfig {
    /// 缓存根目录
    pub root: PathBuf,
    /// 临时条目最大存活时间
    pub ephemeral_age: Duration,
}

impl Default for FileCacheConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("local/sounds"),
            ephemeral_age: Duration::from_secs(15 * 60),
        }
    }
}

/// 文件系统音频缓存
pub struct FileAudioCache {
    root: PathBuf,
    ephemeral_age: Duration,
    /// guid -> 标记时间
    ephemerals: DashMap<String, SystemTime>,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
}

impl FileAudioCache {
    /// 创建缓存，确保根目录存在
    pub async fn new(config: FileCacheConfig) -> Result<Self, CacheError> {
        fs::create_dir_all(&config.root).await?;

        tracing::info!(
            root = %config.root.display(),
            ephemeral_age_secs = config.ephemeral_age.as_secs(),
            "FileAudioCache initialized"
        );

        Ok(Self {
            root: config.root,
            ephemeral_age: config.ephemeral_age,
            ephemerals: DashMap::new(),
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
        })
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ephemeral_age(&self) -> Duration {
        self.ephemeral_age
    }

    /// 已标记的临时 guid
    pub fn ephemeral_guids(&self) -> Vec<String> {
        let mut guids: Vec<String> = self.ephemerals.iter().map(|e| e.key().clone()).collect();
        guids.sort();
        guids
    }

    fn shard_dir(&self, guid: &str, volume: Option<&str>) -> Result<PathBuf, CacheError> {
        validate_guid(guid)?;
        let volume = volume.unwrap_or(COMMON_VOLUME);
        validate_volume(volume)?;
        Ok(self.root.join(volume).join(&guid[..2]))
    }

    fn file_path(
        &self,
        guid: &str,
        volume: Option<&str>,
        suffix: &str,
    ) -> Result<PathBuf, CacheError> {
        if suffix.contains(['/', '\\']) {
            return Err(CacheError::InvalidGuid(format!("{guid}{suffix}")));
        }
        Ok(self
            .shard_dir(guid, volume)?
            .join(format!("{guid}{suffix}")))
    }

    /// 所有 volume 中属于 guid 的文件
    async fn guid_files(&self, guid: &str) -> Result<Vec<PathBuf>, CacheError> {
        let mut files = Vec::new();
        if validate_guid(guid).is_err() {
            return Ok(files);
        }
        let mut volumes = fs::read_dir(&self.root).await?;
        while let Some(volume) = volumes.next_entry().await? {
            let shard = volume.path().join(&guid[..2]);
            let Ok(mut entries) = fs::read_dir(&shard).await else {
                continue;
            };
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if path.file_stem().and_then(|s| s.to_str()) == Some(guid) {
                    files.push(path);
                }
            }
        }
        Ok(files)
    }

    async fn read_signature(
        &self,
        guid: &str,
        volume: Option<&str>,
    ) -> Result<Option<serde_json::Value>, CacheError> {
        let path = self.file_path(guid, volume, SIGNATURE_SUFFIX)?;
        match fs::read(&path).await {
            Ok(data) => serde_json::from_slice(&data)
                .map(Some)
                .map_err(|e| CacheError::IoError(format!("{}: {e}", path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl AudioCachePort for FileAudioCache {
    async fn guid_path(
        &self,
        guid: &str,
        volume: Option<&str>,
        suffix: &str,
    ) -> Result<PathBuf, CacheError> {
        let path = self.file_path(guid, volume, suffix)?;
        if let Some(dir) = path.parent() {
            // 已存在的目录不是错误
            fs::create_dir_all(dir).await?;
        }
        Ok(path)
    }

    async fn store(
        &self,
        guid: &str,
        volume: Option<&str>,
        suffix: &str,
        data: &[u8],
    ) -> Result<PathBuf, CacheError> {
        let path = self.guid_path(guid, volume, suffix).await?;
        let tmp_path = path.with_file_name(format!(
            ".{guid}{suffix}.{}.tmp",
            uuid::Uuid::new_v4().simple()
        ));

        fs::write(&tmp_path, data).await?;
        if let Err(e) = fs::rename(&tmp_path, &path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }

        tracing::debug!(
            guid = %guid,
            volume = volume.unwrap_or(COMMON_VOLUME),
            size = data.len(),
            "Cache entry stored"
        );
        Ok(path)
    }

    async fn retrieve(
        &self,
        guid: &str,
        volume: Option<&str>,
        suffix: &str,
    ) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.file_path(guid, volume, suffix)?;
        match fs::read(&path).await {
            Ok(data) => {
                self.hit_count.fetch_add(1, Ordering::Relaxed);
                Ok(Some(data))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.miss_count.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn store_signature(
        &self,
        guid: &str,
        volume: Option<&str>,
        signature: &serde_json::Value,
    ) -> Result<(), CacheError> {
        let data = serde_json::to_vec_pretty(signature)
            .map_err(|e| CacheError::IoError(e.to_string()))?;
        self.store(guid, volume, SIGNATURE_SUFFIX, &data).await?;
        Ok(())
    }

    async fn sound_info(
        &self,
        guid: &str,
        volume: Option<&str>,
    ) -> Result<Vec<serde_json::Value>, CacheError> {
        let Some(signature) = self.read_signature(guid, volume).await? else {
            return Ok(Vec::new());
        };
        let Some(files) = signature.get("files").and_then(|f| f.as_array()) else {
            return Ok(vec![signature]);
        };

        let mut infos = Vec::with_capacity(files.len());
        for file in files.iter().filter_map(|f| f.as_str()) {
            let info = match self.read_signature(file, volume).await? {
                Some(info) => Some(info),
                None => self.read_signature(file, None).await?,
            };
            infos.extend(info);
        }
        Ok(infos)
    }

    fn add_ephemeral(&self, guid: &str) {
        self.ephemerals.insert(guid.to_string(), SystemTime::now());
    }

    async fn clear_ephemerals(
        &self,
        older_than: Option<SystemTime>,
    ) -> Result<EphemeralSweep, CacheError> {
        let cutoff = older_than.unwrap_or_else(|| SystemTime::now() - self.ephemeral_age);
        let tracked: Vec<(String, SystemTime)> = self
            .ephemerals
            .iter()
            .map(|e| (e.key().clone(), *e.value()))
            .collect();

        let mut deleted = 0;
        for (guid, marked_at) in tracked {
            let files = self.guid_files(&guid).await?;
            let mut kept = 0;
            for path in &files {
                let modified = match fs::metadata(path).await.and_then(|m| m.modified()) {
                    Ok(modified) => modified,
                    // 已被其他操作删除
                    Err(_) => continue,
                };
                // 重新标记（缓存命中）与重写文件一样刷新存活时间
                if modified.max(marked_at) <= cutoff {
                    match fs::remove_file(path).await {
                        Ok(()) => deleted += 1,
                        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                        Err(e) => return Err(e.into()),
                    }
                } else {
                    kept += 1;
                }
            }
            if kept == 0 && (!files.is_empty() || marked_at <= cutoff) {
                self.ephemerals.remove(&guid);
            }
        }

        let sweep = EphemeralSweep {
            deleted,
            remaining: self.ephemerals.len(),
        };
        if deleted > 0 {
            tracing::info!(
                deleted = sweep.deleted,
                remaining = sweep.remaining,
                "Ephemeral cache entries cleared"
            );
        }
        Ok(sweep)
    }

    async fn clear_volume(&self, volume: &str) -> Result<usize, CacheError> {
        if volume.trim().is_empty() {
            return Err(CacheError::NoVolume("<empty>".to_string()));
        }
        validate_volume(volume).map_err(|_| CacheError::NoVolume(volume.to_string()))?;

        let volume_dir = self.root.join(volume);
        match fs::metadata(&volume_dir).await {
            Ok(meta) if meta.is_dir() => {}
            _ => return Err(CacheError::NoVolume(volume.to_string())),
        }

        let files = walk_files(&volume_dir).await?;
        fs::remove_dir_all(&volume_dir).await?;

        tracing::info!(volume = %volume, files_deleted = files.len(), "Volume cleared");
        Ok(files.len())
    }

    async fn volume_info(&self) -> Result<BTreeMap<String, VolumeInfo>, CacheError> {
        let mut info = BTreeMap::new();
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            let size = walk_files(&entry.path())
                .await?
                .iter()
                .map(|(_, len)| len)
                .sum();
            info.insert(name.clone(), VolumeInfo { name, size });
        }
        Ok(info)
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
            ephemeral_count: self.ephemerals.len(),
        }
    }
}

/// guid 只允许字母数字与 - _，且至少 2 个字符
fn validate_guid(guid: &str) -> Result<(), CacheError> {
    let valid = guid.len() >= 2
        && guid
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(CacheError::InvalidGuid(guid.to_string()))
    }
}

fn validate_volume(volume: &str) -> Result<(), CacheError> {
    let valid = !volume.is_empty()
        && volume != "."
        && volume != ".."
        && !volume.contains(['/', '\\']);
    if valid {
        Ok(())
    } else {
        Err(CacheError::NoVolume(volume.to_string()))
    }
}

/// 递归列出目录下所有文件及大小
async fn walk_files(dir: &Path) -> Result<Vec<(PathBuf, u64)>, CacheError> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                pending.push(entry.path());
            } else if file_type.is_file() {
                let len = entry.metadata().await?.len();
                files.push((entry.path(), len));
            }
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::hash_str;
    use tempfile::TempDir;

    async fn cache_in(dir: &TempDir) -> FileAudioCache {
        FileAudioCache::new(FileCacheConfig {
            root: dir.path().join("sounds"),
            ephemeral_age: Duration::from_secs(15 * 60),
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_default_config() {
        let config = FileCacheConfig::default();
        assert_eq!(config.root, PathBuf::from("local/sounds"));
        assert_eq!(config.ephemeral_age, Duration::from_secs(900));
    }

    #[tokio::test]
    async fn test_guid_path_layout() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir).await;
        let guid = hash_str("hello world");
        let root = dir.path().join("sounds");

        let path = cache.guid_path(&guid, None, ".mp3").await.unwrap();
        assert_eq!(
            path,
            root.join("common").join(&guid[..2]).join(format!("{guid}.mp3"))
        );
        assert!(root.join("common").join(&guid[..2]).is_dir());

        let path = cache.guid_path(&guid, Some("test-volume"), ".abc").await.unwrap();
        assert_eq!(
            path,
            root.join("test-volume").join(&guid[..2]).join(format!("{guid}.abc"))
        );
        assert!(root.join("test-volume").join(&guid[..2]).is_dir());

        // 重复创建目录不是错误
        assert!(cache.guid_path(&guid, None, ".mp3").await.is_ok());
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir).await;
        assert!(cache.guid_path("../etc", None, ".mp3").await.is_err());
        assert!(cache.guid_path("abcd", Some(".."), ".mp3").await.is_err());
        assert!(cache.guid_path("abcd", None, "/x").await.is_err());
    }

    #[tokio::test]
    async fn test_store_then_retrieve() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir).await;
        let guid = hash_str("clip");
        let data = vec![0u8, 1, 2, 255, 128];

        assert!(cache.retrieve(&guid, None, ".mp3").await.unwrap().is_none());
        cache.store(&guid, None, ".mp3", &data).await.unwrap();
        assert_eq!(cache.retrieve(&guid, None, ".mp3").await.unwrap(), Some(data));

        let stats = cache.stats();
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.miss_count, 1);

        // 不留下临时文件
        let shard = dir.path().join("sounds/common").join(&guid[..2]);
        let names: Vec<_> = std::fs::read_dir(shard)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec![format!("{guid}.mp3")]);
    }

    #[tokio::test]
    async fn test_sound_info_expands_concatenation() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir).await;
        let part1 = serde_json::json!({"api": "aws-polly", "text": "one", "guid": "aa11"});
        let part2 = serde_json::json!({"api": "aws-polly", "text": "two", "guid": "bb22"});
        let concat = serde_json::json!({"api": "concat", "files": ["aa11", "bb22"], "guid": "cc33"});
        cache.store_signature("aa11", None, &part1).await.unwrap();
        cache.store_signature("bb22", None, &part2).await.unwrap();
        cache.store_signature("cc33", None, &concat).await.unwrap();

        let info = cache.sound_info("cc33", None).await.unwrap();
        assert_eq!(info, vec![part1.clone(), part2]);
        assert_eq!(cache.sound_info("aa11", None).await.unwrap(), vec![part1]);
        assert!(cache.sound_info("dd44", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_ephemeral_tracks_guids() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir).await;
        assert!(cache.ephemeral_guids().is_empty());

        let guids: Vec<String> = (1..=3).map(|i| hash_str(&format!("ephemeral-{i}"))).collect();
        for guid in &guids {
            cache.add_ephemeral(guid);
        }
        let mut expected = guids.clone();
        expected.sort();
        assert_eq!(cache.ephemeral_guids(), expected);

        // 没有文件的临时条目在清除全部时被丢弃
        let sweep = cache.clear_ephemerals(Some(SystemTime::now())).await.unwrap();
        assert_eq!(sweep, EphemeralSweep { deleted: 0, remaining: 0 });
    }

    #[tokio::test]
    async fn test_clear_ephemerals_by_cutoff() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir).await;

        let old = hash_str("ephemeral-old");
        let fresh = hash_str("ephemeral-fresh");
        cache.add_ephemeral(&old);
        cache.add_ephemeral(&fresh);
        let old_path = cache.store(&old, None, ".txt", b"old").await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        let cutoff = SystemTime::now();
        tokio::time::sleep(Duration::from_millis(50)).await;
        let fresh_path = cache.store(&fresh, None, ".txt", b"fresh").await.unwrap();

        let sweep = cache.clear_ephemerals(Some(cutoff)).await.unwrap();
        assert_eq!(sweep.deleted, 1);
        assert_eq!(sweep.remaining, 1);
        assert!(!old_path.exists());
        assert!(fresh_path.exists());
        assert_eq!(cache.ephemeral_guids(), vec![fresh.clone()]);

        // 默认最大存活时间内的条目保留
        let sweep = cache.clear_ephemerals(None).await.unwrap();
        assert_eq!(sweep.deleted, 0);
        assert!(fresh_path.exists());

        let sweep = cache.clear_ephemerals(Some(SystemTime::now())).await.unwrap();
        assert_eq!(sweep, EphemeralSweep { deleted: 1, remaining: 0 });
        assert!(!fresh_path.exists());
    }

    #[tokio::test]
    async fn test_refreshed_ephemeral_survives() {
        let dir = TempDir::new().unwrap();
        let cache = FileAudioCache::new(FileCacheConfig {
            root: dir.path().join("sounds"),
            ephemeral_age: Duration::from_millis(100),
        })
        .await
        .unwrap();

        let stale = hash_str("ephemeral-stale");
        let refreshed = hash_str("ephemeral-refreshed");
        cache.add_ephemeral(&stale);
        cache.add_ephemeral(&refreshed);
        let stale_path = cache.store(&stale, None, ".txt", b"stale").await.unwrap();
        let refreshed_path = cache.store(&refreshed, None, ".txt", b"v1").await.unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;
        cache.store(&refreshed, None, ".txt", b"v2").await.unwrap();

        let sweep = cache.clear_ephemerals(None).await.unwrap();
        assert_eq!(sweep.deleted, 1);
        assert!(!stale_path.exists());
        assert!(refreshed_path.exists());
    }

    #[tokio::test]
    async fn test_remarked_ephemeral_survives() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir).await;

        let guid = hash_str("ephemeral-remarked");
        cache.add_ephemeral(&guid);
        let path = cache.store(&guid, None, ".mp3", b"playlist").await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        let cutoff = SystemTime::now();
        tokio::time::sleep(Duration::from_millis(50)).await;
        // 文件未改动，只重新标记
        cache.add_ephemeral(&guid);

        let sweep = cache.clear_ephemerals(Some(cutoff)).await.unwrap();
        assert_eq!(sweep, EphemeralSweep { deleted: 0, remaining: 1 });
        assert!(path.exists());
        assert_eq!(cache.ephemeral_guids(), vec![guid.clone()]);

        let sweep = cache.clear_ephemerals(Some(SystemTime::now())).await.unwrap();
        assert_eq!(sweep, EphemeralSweep { deleted: 1, remaining: 0 });
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_concurrent_store_same_guid() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir).await;
        let guid = hash_str("concurrent");
        let data = vec![7u8; 4096];

        let (a, b) = tokio::join!(
            cache.store(&guid, None, ".mp3", &data),
            cache.store(&guid, None, ".mp3", &data),
        );
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(cache.retrieve(&guid, None, ".mp3").await.unwrap(), Some(data));

        // 只剩最终文件，没有残留的临时文件
        let shard = dir.path().join("sounds/common").join(&guid[..2]);
        let names: Vec<_> = std::fs::read_dir(shard)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec![format!("{guid}.mp3")]);
    }

    #[tokio::test]
    async fn test_clear_volume() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir).await;
        let path1 = cache.store("clear-v1", Some("test-v1"), ".test", b"test-f1").await.unwrap();
        let path2 = cache.store("clear-v2", Some("test-v2"), ".test", b"test-f2").await.unwrap();

        let err = cache.clear_volume("").await.unwrap_err();
        assert!(err.to_string().contains("no volume"));
        let err = cache.clear_volume("no-volume").await.unwrap_err();
        assert!(err.to_string().contains("no volume"));
        assert!(path1.exists());
        assert!(path2.exists());

        assert_eq!(cache.clear_volume("test-v1").await.unwrap(), 1);
        assert!(!path1.exists());
        assert!(path2.exists());

        // 文件被 clear_volume 删除后，临时条目清理不受影响
        let path1 = cache.store("clear-v1", Some("test-v1"), ".test", b"test-f1").await.unwrap();
        cache.add_ephemeral("clear-v1");
        cache.clear_volume("test-v1").await.unwrap();
        assert!(!path1.exists());
        cache.clear_ephemerals(Some(SystemTime::now())).await.unwrap();
        assert!(cache.ephemeral_guids().is_empty());
        assert!(path2.exists());
    }

    #[tokio::test]
    async fn test_volume_info() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir).await;
        assert!(cache.volume_info().await.unwrap().is_empty());

        cache.store("aa01", Some("v1"), ".mp3", &[0; 10]).await.unwrap();
        cache.store("bb02", Some("v1"), ".mp3", &[0; 5]).await.unwrap();
        cache.store("cc03", Some("v2"), ".mp3", &[0; 7]).await.unwrap();

        let info = cache.volume_info().await.unwrap();
        assert_eq!(info.len(), 2);
        assert_eq!(info["v1"], VolumeInfo { name: "v1".into(), size: 15 });
        assert_eq!(info["v2"], VolumeInfo { name: "v2".into(), size: 7 });
    }
}
