use anyhow::Context;
use blockwork_editor::SessionOptions;
use blockwork_renderer::{RawHtmlPolicy, RenderOptions};
use blockwork_style::Breakpoint;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "blockwork.config.json";

/// Blockwork configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Breakpoint used for inline style resolution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakpoint: Option<Breakpoint>,

    /// Handling of `CustomHTML` markup (trust, escape, drop)
    pub raw_html: RawHtmlPolicy,

    /// Pretty print rendered HTML
    pub pretty: bool,

    /// Emit a stylesheet instead of inline styles
    pub emit_css: bool,

    /// Log filter used when `RUST_LOG` is unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Quiet period for editor field commits
    pub debounce_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            breakpoint: None,
            raw_html: RawHtmlPolicy::default(),
            pretty: true,
            emit_css: false,
            log_level: None,
            debounce_ms: 300,
        }
    }
}

impl Config {
    /// Load config from a directory; a missing file means defaults
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid config file {}", config_path.display()))
        } else {
            Ok(Config::default())
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::default()
            .with_breakpoint(self.breakpoint)
            .with_raw_html(self.raw_html)
            .with_css(self.emit_css)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            debounce: Duration::from_millis(self.debounce_ms),
            render: self.render_options(),
            ..SessionOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "breakpoint": "md",
            "rawHtml": "escape",
            "emitCss": true,
            "logLevel": "debug",
            "debounceMs": 150
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.breakpoint, Some(Breakpoint::Md));
        assert_eq!(config.raw_html, RawHtmlPolicy::Escape);
        assert!(config.pretty);
        assert!(config.emit_css);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.session_options().debounce, Duration::from_millis(150));
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.breakpoint, None);
        assert_eq!(config.raw_html, RawHtmlPolicy::Trust);
        assert_eq!(config.render_options(), RenderOptions::default());
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load(dir.path()).unwrap(), Config::default());
    }
}
