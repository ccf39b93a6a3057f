//! `build` command: post-process a generated site in place.
//!
//! Phases:
//! - **Collect** - list the output directory once, split pages and assets
//! - **Rename** - fingerprint assets (friends images transformed first)
//! - **Rewrite** - point every page at the renamed assets, minify
//! - **Manifest** - optional `original → hashed` JSON

use std::sync::Arc;

use anyhow::{Context, Result, bail};

use crate::{
    config::SiteConfig,
    core::BuildMode,
    log,
    logger::ProgressLine,
    pipeline::{self, BuildReport, Routes},
    route::{DiskRoutes, RouteStore},
    utils::plural_count,
};

/// Run the pipeline over the configured output directory.
pub fn build_site(config: &SiteConfig, mode: BuildMode, quiet: bool) -> Result<BuildReport> {
    let output = config.output_dir();
    if !output.is_dir() {
        bail!(
            "output directory `{}` does not exist, generate the site first",
            output.display()
        );
    }

    let store: Arc<dyn RouteStore> = Arc::new(DiskRoutes::new(output.clone()));
    let routes = Routes::collect(store.as_ref(), &config.build.assets);
    let progress = create_progress(&routes, quiet);

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;
    let report = rt.block_on(pipeline::run(store, routes, config, mode, progress.as_ref()))?;

    if let Some(p) = progress {
        p.finish();
    }

    if !quiet {
        log!(
            "build";
            "{} fingerprinted, {} rewritten{}",
            plural_count(report.renamed, "asset"),
            plural_count(report.rewritten, "page"),
            if mode.live_preview { " (preview)" } else { "" }
        );
    }

    Ok(report)
}

fn create_progress(routes: &Routes, quiet: bool) -> Option<ProgressLine> {
    if quiet {
        return None;
    }
    Some(ProgressLine::new(&[
        ("assets", routes.assets.len()),
        ("pages", routes.pages.len()),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site(dir: &TempDir) -> SiteConfig {
        let mut config = crate::config::test_parse_config(
            "[build]\noutput = \"public\"\ncdn_root = \"https://cdn.example.com/\"\n",
        );
        config.root = dir.path().to_path_buf();
        config
    }

    #[test]
    fn test_build_site_on_disk() {
        let dir = TempDir::new().unwrap();
        let public = dir.path().join("public");
        fs::create_dir_all(public.join("css")).unwrap();
        fs::write(public.join("css/style.css"), "body{}").unwrap();
        fs::write(
            public.join("index.html"),
            r#"<html><head><link rel="stylesheet" href="/css/style.css"></head><body></body></html>"#,
        )
        .unwrap();

        let report = build_site(&site(&dir), BuildMode::PRODUCTION, true).unwrap();
        assert_eq!(report.renamed, 1);
        assert_eq!(report.rewritten, 1);

        let hashed = report.remap.get("css/style.css").unwrap().to_string();
        assert!(public.join(&hashed).is_file());
        assert!(!public.join("css/style.css").exists());

        let html = fs::read_to_string(public.join("index.html")).unwrap();
        assert!(html.contains(&format!("//cdn.example.com/{hashed}")));
    }

    #[test]
    fn test_missing_output_dir() {
        let dir = TempDir::new().unwrap();
        let err = build_site(&site(&dir), BuildMode::PRODUCTION, true).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
