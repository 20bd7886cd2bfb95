use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("model bundle not found: {0}")]
    Missing(PathBuf),
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Where model bundles come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelLocation {
    /// Local directory checked first.
    pub dir: PathBuf,
    /// Base URL bundles are fetched from when missing locally.
    pub base_url: Option<String>,
}

impl ModelLocation {
    pub fn directory(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    fn url_for(base_url: &str, name: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), name)
    }
}

/// Resolve a model bundle by name.
///
/// Resolution order:
/// 1. The configured model directory
/// 2. User cache directory (only when a base URL is configured)
/// 3. Download from `{base_url}/{name}` into the cache
pub fn resolve(
    name: &str,
    location: &ModelLocation,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    let local_path = location.dir.join(name);
    if local_path.is_file() {
        return Ok(local_path);
    }

    let Some(base_url) = location.base_url.as_deref() else {
        return Err(ModelResolveError::Missing(local_path));
    };

    let cache_dir = model_cache_dir()?;
    let cached_path = cache_dir.join(name);
    if cached_path.is_file() {
        return Ok(cached_path);
    }

    fs::create_dir_all(&cache_dir).map_err(ModelResolveError::CacheDir)?;
    let url = ModelLocation::url_for(base_url, name);
    log::info!("Downloading model bundle {name} from {url}");
    download(&url, &cached_path, progress)?;
    Ok(cached_path)
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/FaceOverlay/models/`
/// - Linux: `$XDG_CACHE_HOME/FaceOverlay/models/` or `~/.cache/FaceOverlay/models/`
/// - Windows: `%LOCALAPPDATA%/FaceOverlay/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join("FaceOverlay").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join("FaceOverlay").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
}

fn download(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), ModelResolveError> {
    let temp_path = dest.with_extension("part");

    let result = download_inner(url, dest, &temp_path, progress);
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn download_inner(
    url: &str,
    dest: &Path,
    temp_path: &Path,
    progress: Option<ProgressFn>,
) -> Result<(), ModelResolveError> {
    let write_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| ModelResolveError::Write { path, source }
    };

    let mut response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| ModelResolveError::Download {
            url: url.to_string(),
            source: e,
        })?;

    let total = response.content_length().unwrap_or(0);
    let mut downloaded: u64 = 0;
    let mut file = fs::File::create(temp_path).map_err(write_err(temp_path))?;

    let mut buf = vec![0u8; 256 * 1024];
    loop {
        let n = response.read(&mut buf).map_err(write_err(temp_path))?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n]).map_err(write_err(temp_path))?;
        downloaded += n as u64;
        if let Some(ref cb) = progress {
            cb(downloaded, total);
        }
    }

    file.flush().map_err(write_err(temp_path))?;
    drop(file);

    fs::rename(temp_path, dest).map_err(write_err(dest))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_prefers_local_directory() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tiny.onnx");
        fs::write(&path, b"model").unwrap();

        let location = ModelLocation::directory(tmp.path()).with_base_url("http://unused.invalid");
        assert_eq!(resolve("tiny.onnx", &location, None).unwrap(), path);
    }

    #[test]
    fn test_resolve_missing_without_url_is_error() {
        let tmp = TempDir::new().unwrap();
        let location = ModelLocation::directory(tmp.path());
        let err = resolve("absent.onnx", &location, None).unwrap_err();
        match err {
            ModelResolveError::Missing(path) => assert_eq!(path, tmp.path().join("absent.onnx")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_directory_entry_is_not_a_bundle() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("dir.onnx")).unwrap();
        let location = ModelLocation::directory(tmp.path());
        assert!(resolve("dir.onnx", &location, None).is_err());
    }

    #[test]
    fn test_url_for_joins_without_double_slash() {
        assert_eq!(
            ModelLocation::url_for("https://host/models/", "a.onnx"),
            "https://host/models/a.onnx"
        );
        assert_eq!(
            ModelLocation::url_for("https://host/models", "a.onnx"),
            "https://host/models/a.onnx"
        );
    }

    #[test]
    fn test_model_cache_dir_is_app_scoped() {
        let path = model_cache_dir().unwrap();
        assert!(path.to_string_lossy().contains("FaceOverlay"));
        assert!(path.ends_with("models"));
    }

    #[test]
    fn test_failed_download_leaves_no_partial_file() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("model.onnx");
        let result = download("http://invalid.nonexistent.example.com/model", &dest, None);
        assert!(result.is_err());
        assert!(!dest.exists());
        assert!(!dest.with_extension("part").exists());
    }
}
