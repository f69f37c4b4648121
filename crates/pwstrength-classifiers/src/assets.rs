//! Pre-trained asset download
//!
//! Fetches a trained model, its feature list and the training CSV from a
//! Hugging Face repository instead of training locally.

use hf_hub::api::sync::{Api, ApiBuilder};
use hf_hub::{Repo, RepoType};
use pwstrength_core::{AssetRepoType, AssetsConfig, Error, Result};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Where asset files come from.
///
/// `fetch` returns a local path holding the file's contents; the caller
/// copies it into place.
pub trait AssetSource: Send + Sync {
    /// Fetch one file by name
    fn fetch(&self, filename: &str) -> Result<PathBuf>;

    /// Human-readable location, for logging
    fn describe(&self) -> String;
}

/// Hugging Face Hub source backed by the local hub cache
pub struct HuggingFaceSource {
    api: Api,
    repo_id: String,
    repo_type: AssetRepoType,
    revision: String,
}

impl HuggingFaceSource {
    /// Create a source for the configured repository
    pub fn new(config: &AssetsConfig) -> Result<Self> {
        let api = ApiBuilder::new()
            .with_progress(false)
            .build()
            .map_err(|e| Error::download(format!("Failed to initialize HF API: {}", e)))?;

        Ok(Self {
            api,
            repo_id: config.repo_id.clone(),
            repo_type: config.repo_type,
            revision: config.revision.clone(),
        })
    }

    fn repo(&self) -> Repo {
        let repo_type = match self.repo_type {
            AssetRepoType::Model => RepoType::Model,
            AssetRepoType::Dataset => RepoType::Dataset,
            AssetRepoType::Space => RepoType::Space,
        };
        Repo::with_revision(self.repo_id.clone(), repo_type, self.revision.clone())
    }
}

impl AssetSource for HuggingFaceSource {
    fn fetch(&self, filename: &str) -> Result<PathBuf> {
        self.api
            .repo(self.repo())
            .get(filename)
            .map_err(|e| Error::download(format!("Failed to download {} from HF: {}", filename, e)))
    }

    fn describe(&self) -> String {
        format!("hf://{}@{}", self.repo_id, self.revision)
    }
}

/// Outcome of a download run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DownloadReport {
    /// Files written to the output directory
    pub downloaded: Vec<PathBuf>,

    /// Files not attempted
    pub skipped: Vec<String>,

    /// Files that failed, with the reason
    pub failed: Vec<(String, String)>,
}

impl DownloadReport {
    /// True when every requested file was downloaded
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.failed.is_empty()
    }
}

/// True when the repo id has not been filled in yet
pub fn is_placeholder(repo_id: &str) -> bool {
    let repo_id = repo_id.trim();
    repo_id.is_empty() || repo_id.starts_with("PASTE_")
}

/// Download every configured asset into `config.output_dir`
///
/// A failure on one file is logged and recorded; the remaining files are
/// still attempted.
pub fn download_assets(config: &AssetsConfig, source: &dyn AssetSource) -> Result<DownloadReport> {
    let mut report = DownloadReport::default();

    if is_placeholder(&config.repo_id) {
        warn!("Asset repository id is not set, skipping all downloads");
        report.skipped = config.files.clone();
        return Ok(report);
    }

    std::fs::create_dir_all(&config.output_dir)?;
    info!(
        "Downloading {} assets from {}",
        config.files.len(),
        source.describe()
    );

    for filename in &config.files {
        match fetch_into(source, filename, &config.output_dir) {
            Ok(path) => {
                info!("Downloaded {}", path.display());
                report.downloaded.push(path);
            }
            Err(e) => {
                error!("Error downloading {}: {}", filename, e);
                report.failed.push((filename.clone(), e.to_string()));
            }
        }
    }

    Ok(report)
}

fn fetch_into(source: &dyn AssetSource, filename: &str, output_dir: &Path) -> Result<PathBuf> {
    let name = Path::new(filename)
        .file_name()
        .ok_or_else(|| Error::download(format!("invalid asset name '{}'", filename)))?;
    let fetched = source.fetch(filename)?;
    let target = output_dir.join(name);
    std::fs::copy(&fetched, &target)?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Serves files from a map of name -> contents written to a scratch dir
    struct LocalSource {
        dir: tempfile::TempDir,
        files: HashMap<String, String>,
    }

    impl LocalSource {
        fn new(files: &[(&str, &str)]) -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
                files: files
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            }
        }
    }

    impl AssetSource for LocalSource {
        fn fetch(&self, filename: &str) -> Result<PathBuf> {
            let contents = self
                .files
                .get(filename)
                .ok_or_else(|| Error::download(format!("404 for {}", filename)))?;
            let path = self.dir.path().join(filename);
            std::fs::write(&path, contents)?;
            Ok(path)
        }

        fn describe(&self) -> String {
            "local".to_string()
        }
    }

    fn config_for(output_dir: &Path) -> AssetsConfig {
        AssetsConfig {
            output_dir: output_dir.to_path_buf(),
            ..AssetsConfig::default()
        }
    }

    #[test]
    fn test_downloads_all_files() {
        let out = tempfile::tempdir().unwrap();
        let source = LocalSource::new(&[
            ("password_strength_model.json", "{}"),
            ("model_features.json", "[]"),
            ("password_data.csv", "strength_class\n"),
        ]);

        let report = download_assets(&config_for(out.path()), &source).unwrap();
        assert!(report.is_complete());
        assert_eq!(report.downloaded.len(), 3);
        assert_eq!(
            std::fs::read_to_string(out.path().join("model_features.json")).unwrap(),
            "[]"
        );
    }

    #[test]
    fn test_failure_does_not_stop_other_files() {
        let out = tempfile::tempdir().unwrap();
        let source = LocalSource::new(&[("model_features.json", "[]")]);

        let report = download_assets(&config_for(out.path()), &source).unwrap();
        assert_eq!(report.downloaded, vec![out.path().join("model_features.json")]);
        assert_eq!(report.failed.len(), 2);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_placeholder_repo_skips_everything() {
        let out = tempfile::tempdir().unwrap();
        let config = AssetsConfig {
            repo_id: "PASTE_THE_RAW_REPO_HERE".to_string(),
            ..config_for(out.path())
        };
        let source = LocalSource::new(&[]);

        let report = download_assets(&config, &source).unwrap();
        assert_eq!(report.skipped.len(), 3);
        assert!(report.downloaded.is_empty());
        assert!(report.failed.is_empty());
    }

    #[test]
    fn test_placeholder_detection() {
        assert!(is_placeholder(""));
        assert!(is_placeholder("  "));
        assert!(is_placeholder("PASTE_ME"));
        assert!(!is_placeholder("aT-404/password-analyzer-assets"));
    }
}
