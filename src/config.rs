use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Name of the render worker executable.
pub const WORKER_BIN: &str = "matchup-histogram";

// ---------------------------------------------------------------------------
// Render configuration
// ---------------------------------------------------------------------------

/// Image size and worker-process settings.
///
/// ```toml
/// width = 800
/// height = 600
/// timeout_secs = 10
/// worker = "/opt/matchup/bin/matchup-histogram"
/// ```
///
/// Every key is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// How long a worker may run before it is killed.
    pub timeout_secs: u64,
    /// Worker executable; see [`RenderConfig::worker_path`].
    pub worker: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            timeout_secs: 30,
            worker: None,
        }
    }
}

impl RenderConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("parsing render config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("loading {}", path.display()))
    }

    /// `(width, height)` of rendered images in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The configured worker, or the worker binary installed next to the
    /// running executable.
    pub fn worker_path(&self) -> PathBuf {
        if let Some(path) = &self.worker {
            return path.clone();
        }
        let exe_name = format!("{WORKER_BIN}{}", std::env::consts::EXE_SUFFIX);
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(&exe_name)))
            .unwrap_or_else(|| PathBuf::from(exe_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = RenderConfig::default();
        assert_eq!(cfg.size(), (640, 480));
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
        assert!(cfg.worker_path().ends_with(format!(
            "{WORKER_BIN}{}",
            std::env::consts::EXE_SUFFIX
        )));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg = RenderConfig::from_toml_str("timeout_secs = 5\nworker = \"/tmp/w\"").unwrap();
        assert_eq!(cfg.timeout_secs, 5);
        assert_eq!(cfg.width, 640);
        assert_eq!(cfg.worker_path(), PathBuf::from("/tmp/w"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(RenderConfig::from_toml_str("dpi = 100").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("render.toml");
        std::fs::write(&path, "width = 320\nheight = 240\n").unwrap();
        let cfg = RenderConfig::load(&path).unwrap();
        assert_eq!(cfg.size(), (320, 240));
    }
}
