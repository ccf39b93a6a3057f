//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Static site post-processor: asset fingerprinting, CDN rewriting, markdown rendering
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: postsite.toml)
    #[arg(short = 'C', long, global = true, default_value = "postsite.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Fingerprint assets and rewrite URLs in the generated site
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Render a markdown file to HTML on stdout
    #[command(visible_alias = "r")]
    Render {
        #[command(flatten)]
        args: RenderArgs,
    },

    /// Print the normalized form of a post permalink
    #[command(visible_alias = "p")]
    Permalink {
        /// Permalink to normalize (e.g. /posts/hello)
        link: String,
    },
}

/// Build command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Live-preview build: no CDN prefix, no minification, keep URL schemes
    #[arg(short, long)]
    pub preview: bool,

    /// Generated site directory (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// CDN origin prefixed to rewritten URLs (must end with `/`)
    #[arg(long = "cdn-root", value_hint = clap::ValueHint::Url)]
    pub cdn_root: Option<String>,

    /// Minify the HTML content
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify: Option<bool>,

    /// Minify JS and CSS assets before fingerprinting
    #[arg(long = "minify-assets", action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify_assets: Option<bool>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

/// Render command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct RenderArgs {
    /// Markdown file to render
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub file: PathBuf,

    /// Demote links to spans for use as an excerpt
    #[arg(short, long)]
    pub excerpt: bool,
}

#[allow(unused)]
impl Cli {
    pub const fn is_build(&self) -> bool {
        matches!(self.command, Commands::Build { .. })
    }
    pub const fn is_render(&self) -> bool {
        matches!(self.command, Commands::Render { .. })
    }
    pub const fn is_permalink(&self) -> bool {
        matches!(self.command, Commands::Permalink { .. })
    }
    /// Whether the command needs a config file on disk.
    pub const fn needs_config(&self) -> bool {
        self.is_build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build() {
        let cli = Cli::parse_from([
            "postsite",
            "build",
            "--preview",
            "--cdn-root",
            "https://cdn.example.com/",
            "--minify",
            "false",
            "--minify-assets",
            "-q",
        ]);
        let Commands::Build { build_args } = cli.command else {
            panic!("expected build");
        };
        assert!(build_args.preview);
        assert!(build_args.quiet);
        assert_eq!(build_args.cdn_root.as_deref(), Some("https://cdn.example.com/"));
        assert_eq!(build_args.minify, Some(false));
        assert_eq!(build_args.minify_assets, Some(true));
        assert_eq!(build_args.output, None);
    }

    #[test]
    fn test_parse_render_with_globals() {
        let cli = Cli::parse_from(["postsite", "render", "post.md", "--excerpt", "-v", "-C", "site.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("site.toml"));
        assert!(!cli.needs_config());
        let Commands::Render { args } = cli.command else {
            panic!("expected render");
        };
        assert_eq!(args.file, PathBuf::from("post.md"));
        assert!(args.excerpt);
    }

    #[test]
    fn test_parse_permalink() {
        let cli = Cli::parse_from(["postsite", "permalink", "/posts/hello"]);
        assert!(cli.is_permalink());
        assert_eq!(cli.config, PathBuf::from("postsite.toml"));
    }
}
