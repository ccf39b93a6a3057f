//! postsite - post-processor for generated static sites.
//!
//! Fingerprints assets, rewrites URLs to the hashed (optionally CDN-hosted)
//! paths, and renders markdown with the site's post-processing rules.

mod asset;
mod cli;
mod compiler;
mod config;
mod core;
mod image;
mod logger;
mod pipeline;
mod route;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands, build::build_site, render::render_file};
use config::SiteConfig;
use core::BuildMode;

fn main() {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    if let Err(e) = run(&cli) {
        log!("error"; "{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = SiteConfig::load(cli)?;

    match &cli.command {
        Commands::Build { build_args } => {
            let mode = if build_args.preview {
                BuildMode::PREVIEW
            } else {
                BuildMode::PRODUCTION
            };
            build_site(&config, mode, build_args.quiet).map(|_| ())
        }
        Commands::Render { args } => render_file(args, &config),
        Commands::Permalink { link } => {
            println!("{}", compiler::normalize_permalink(link));
            Ok(())
        }
    }
}
