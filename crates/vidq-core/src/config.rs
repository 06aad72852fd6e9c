use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// What to do when the final artifact name is already taken in the output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Pick `name (1).ext`, `name (2).ext`, ... until a free name is found.
    #[default]
    Rename,
    /// Replace the existing file.
    Overwrite,
}

/// Global configuration loaded from `~/.config/vidq/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VidqConfig {
    /// Maximum number of jobs with a running external process.
    pub max_concurrent: usize,
    /// Directory receiving finished artifacts. Relative paths resolve against the working directory.
    pub output_dir: PathBuf,
    /// Video-fetching tool (name looked up in PATH, or an absolute path).
    pub fetch_tool: PathBuf,
    /// Media-transcoding tool used for local conversions.
    pub convert_tool: PathBuf,
    /// Upper bound on the metadata-only title probe.
    pub title_probe_timeout_secs: u64,
    /// Scheduler tick interval in milliseconds.
    pub tick_interval_ms: u64,
    /// Copy every raw tool output line into the log file (target `vidq::tool_output`).
    pub log_tool_output: bool,
    /// Quality preset used by `vidq add` for remote sources when none is given.
    pub default_remote_quality: String,
    /// Quality preset used by `vidq add` for local conversions when none is given.
    pub default_local_quality: String,
    pub on_conflict: ConflictPolicy,
}

impl Default for VidqConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 2,
            output_dir: PathBuf::from("downloads"),
            fetch_tool: PathBuf::from("yt-dlp"),
            convert_tool: PathBuf::from("ffmpeg"),
            title_probe_timeout_secs: 30,
            tick_interval_ms: 1000,
            log_tool_output: false,
            default_remote_quality: "Auto (Best available)".to_string(),
            default_local_quality: "Medium Quality MP4".to_string(),
            on_conflict: ConflictPolicy::Rename,
        }
    }
}

impl VidqConfig {
    /// Rejects values the scheduler cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTick);
        }
        if self.title_probe_timeout_secs == 0 {
            return Err(ConfigError::ZeroProbeTimeout);
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn title_probe_timeout(&self) -> Duration {
        Duration::from_secs(self.title_probe_timeout_secs)
    }

    /// Output directory resolved against `base` when relative.
    pub fn resolved_output_dir(&self, base: &Path) -> PathBuf {
        if self.output_dir.is_absolute() {
            self.output_dir.clone()
        } else {
            base.join(&self.output_dir)
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("vidq")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<VidqConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = VidqConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: VidqConfig = toml::from_str(&data)?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = VidqConfig::default();
        assert_eq!(cfg.max_concurrent, 2);
        assert_eq!(cfg.output_dir, PathBuf::from("downloads"));
        assert_eq!(cfg.tick_interval(), Duration::from_secs(1));
        assert_eq!(cfg.title_probe_timeout(), Duration::from_secs(30));
        assert_eq!(cfg.on_conflict, ConflictPolicy::Rename);
        assert!(!cfg.log_tool_output);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = VidqConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: VidqConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.max_concurrent, cfg.max_concurrent);
        assert_eq!(parsed.fetch_tool, cfg.fetch_tool);
        assert_eq!(parsed.default_local_quality, cfg.default_local_quality);
    }

    #[test]
    fn config_toml_partial_uses_defaults() {
        let toml = r#"
            max_concurrent = 4
            fetch_tool = "/opt/bin/yt-dlp"
            on_conflict = "overwrite"
        "#;
        let cfg: VidqConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.max_concurrent, 4);
        assert_eq!(cfg.fetch_tool, PathBuf::from("/opt/bin/yt-dlp"));
        assert_eq!(cfg.on_conflict, ConflictPolicy::Overwrite);
        assert_eq!(cfg.convert_tool, PathBuf::from("ffmpeg"));
        assert_eq!(cfg.tick_interval_ms, 1000);
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let cfg = VidqConfig {
            max_concurrent: 0,
            ..VidqConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::ZeroConcurrency)));
    }

    #[test]
    fn relative_output_dir_resolves_against_base() {
        let cfg = VidqConfig::default();
        assert_eq!(
            cfg.resolved_output_dir(Path::new("/home/u")),
            PathBuf::from("/home/u/downloads")
        );
        let abs = VidqConfig {
            output_dir: PathBuf::from("/srv/media"),
            ..VidqConfig::default()
        };
        assert_eq!(
            abs.resolved_output_dir(Path::new("/home/u")),
            PathBuf::from("/srv/media")
        );
    }
}
