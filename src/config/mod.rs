//! Site configuration management for `postsite.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── build/     # [build] and sub-sections
//! │   └── markdown   # [markdown]
//! ├── types/         # Utility types
//! │   └── error      # ConfigError
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section            | Purpose                                        |
//! |--------------------|------------------------------------------------|
//! | `[build]`          | Output directory, CDN origin, HTML minify      |
//! | `[build.assets]`   | Hashable extensions, JS/CSS minify             |
//! | `[build.friends]`  | Friends page image namespace                   |
//! | `[build.rewrite]`  | HTML rewrite targets                           |
//! | `[markdown]`       | Highlighting, math and heading anchors         |

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

// Re-export from section/
pub use section::{
    AssetsConfig, BuildSectionConfig, FriendsConfig, MarkdownConfig, RewriteConfig,
};

// Re-export from types/
pub use types::ConfigError;

use crate::{
    cli::{BuildArgs, Cli, Commands},
    log,
};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing postsite.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Post-processing settings
    #[serde(default)]
    pub build: BuildSectionConfig,

    /// Markdown rendering settings
    #[serde(default)]
    pub markdown: MarkdownConfig,
}

impl SiteConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd to find the config file. The project root is
    /// the config file's parent directory. Only `build` requires a config
    /// file; other commands fall back to defaults.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| cwd.clone());
                config.config_path = path;
                config
            }
            None if !cli.needs_config() => Self {
                root: cwd,
                ..Self::default()
            },
            None => bail!(
                "Config file '{}' not found in this directory or any parent",
                cli.config.display()
            ),
        };

        config.apply_command_options(cli);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }

    /// Generated site directory, resolved against the project root.
    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.build.output)
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Build { build_args } => self.apply_build_args(build_args),
            Commands::Render { .. } | Commands::Permalink { .. } => {}
        }
    }

    /// Apply build arguments from CLI.
    fn apply_build_args(&mut self, args: &BuildArgs) {
        Self::update_option(&mut self.build.output, args.output.as_ref());
        Self::update_option(&mut self.build.cdn_root, args.cdn_root.as_ref());
        Self::update_option(&mut self.build.minify, args.minify.as_ref());
        Self::update_option(&mut self.build.assets.minify, args.minify_assets.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        self.build.validate()?;
        Ok(())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config from TOML.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    let (parsed, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SiteConfig::from_str("").unwrap();
        assert_eq!(config.build.cdn_root, "/");
        assert!(config.markdown.highlight);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_fields_collected() {
        let (config, ignored) = SiteConfig::parse_with_ignored(
            r#"
[build]
cdn_root = "https://cdn.example.com/"
cnd_root = "typo"

[markdown]
mathjax = true
"#,
        )
        .unwrap();
        assert_eq!(config.build.cdn_root, "https://cdn.example.com/");
        assert_eq!(ignored, vec!["build.cnd_root", "markdown.mathjax"]);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(SiteConfig::from_str("[build\n").is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "postsite",
            "build",
            "--cdn-root",
            "https://cdn.example.com/",
            "--minify",
            "false",
            "-o",
            "dist",
        ]);
        let mut config = test_parse_config("[build]\nminify = true\n");
        config.root = PathBuf::from("/site");
        config.apply_command_options(&cli);

        assert_eq!(config.build.cdn_root, "https://cdn.example.com/");
        assert!(!config.build.minify);
        assert_eq!(config.output_dir(), PathBuf::from("/site/dist"));
    }

    #[test]
    fn test_cdn_root_validated() {
        let config = test_parse_config("[build]\ncdn_root = \"https://cdn.example.com\"\n");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cdn_root"));
    }
}
