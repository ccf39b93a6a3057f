//! Post-processing pipeline driver.
//!
//! Stages run in a fixed order with a barrier between them:
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  Rename (one blocking task per asset)    │
//! │  read -> transform -> hash -> move       │
//! └────────────────────┬─────────────────────┘
//!                      │ RemapTable (frozen)
//! ┌────────────────────▼─────────────────────┐
//! │  Rewrite (one blocking task per page)    │
//! │  read -> rewrite URLs -> minify -> write │
//! └────────────────────┬─────────────────────┘
//!                      │
//!               manifest (optional)
//! ```
//!
//! Every page may reference every asset, so no page is rewritten before all
//! renames have finished. A failing task aborts the whole run.

pub mod minify;
mod rewrite;

pub use rewrite::{RewriteContext, rewrite_document};

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::JoinSet;

use crate::asset::{RemapTable, RenameContext, rename_asset};
use crate::config::{AssetsConfig, SiteConfig};
use crate::core::BuildMode;
use crate::logger::ProgressLine;
use crate::route::RouteStore;
use crate::utils::path::extension_lower;
use crate::{debug, log};
use minify::minify_html;

/// Routes taking part in a run, split by stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Routes {
    /// Non-HTML routes with a hashable extension.
    pub assets: Vec<String>,
    /// HTML routes.
    pub pages: Vec<String>,
}

impl Routes {
    /// List the store once and partition its routes.
    ///
    /// Non-HTML routes without a hashable extension belong to neither stage.
    pub fn collect(store: &dyn RouteStore, assets: &AssetsConfig) -> Self {
        let mut routes = Self::default();
        for path in store.list() {
            if extension_lower(&path) == ".html" {
                routes.pages.push(path);
            } else if assets.is_hashable(&path) {
                routes.assets.push(path);
            }
        }
        routes.assets.sort_unstable();
        routes.pages.sort_unstable();
        routes
    }
}

/// Outcome of a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Assets moved to a fingerprinted path.
    pub renamed: usize,
    /// HTML pages rewritten.
    pub rewritten: usize,
    /// Final remap table.
    pub remap: RemapTable,
}

/// Run both stages over `routes` and write the manifest if configured.
pub async fn run(
    store: Arc<dyn RouteStore>,
    routes: Routes,
    config: &SiteConfig,
    mode: BuildMode,
    progress: Option<&ProgressLine>,
) -> Result<BuildReport> {
    let rename_ctx = Arc::new(RenameContext {
        assets: config.build.assets.clone(),
        friends: config.build.friends.clone(),
        mode,
    });
    let remap = rename_stage(&store, routes.assets, rename_ctx, progress).await?;
    let renamed = remap.len();
    debug!("hash"; "{} assets renamed", renamed);

    let rewrite_ctx = Arc::new(RewriteContext {
        remap,
        rules: config.build.rewrite.clone(),
        cdn_root: config.build.cdn_root.clone(),
        mode,
        minify: config.build.minify && mode.minify(),
    });
    let rewritten = rewrite_stage(&store, routes.pages, Arc::clone(&rewrite_ctx), progress).await?;

    let remap = Arc::try_unwrap(rewrite_ctx)
        .map(|ctx| ctx.remap)
        .unwrap_or_else(|ctx| ctx.remap.clone());

    if !config.build.manifest.is_empty() {
        write_manifest(store.as_ref(), &config.build.manifest, &remap)?;
    }

    Ok(BuildReport {
        renamed,
        rewritten,
        remap,
    })
}

/// Barrier 1: rename every asset, collecting the remap table.
async fn rename_stage(
    store: &Arc<dyn RouteStore>,
    assets: Vec<String>,
    ctx: Arc<RenameContext>,
    progress: Option<&ProgressLine>,
) -> Result<RemapTable> {
    let mut tasks = JoinSet::new();
    for path in assets {
        let store = Arc::clone(store);
        let ctx = Arc::clone(&ctx);
        tasks.spawn_blocking(move || rename_asset(store.as_ref(), &path, &ctx));
    }

    let mut remap = RemapTable::new();
    while let Some(joined) = tasks.join_next().await {
        if let Some((original, renamed)) = joined.context("asset task failed")?? {
            remap.insert(original, renamed);
        }
        if let Some(p) = progress {
            p.inc("assets");
        }
    }
    Ok(remap)
}

/// Barrier 2: rewrite every page against the frozen remap table.
async fn rewrite_stage(
    store: &Arc<dyn RouteStore>,
    pages: Vec<String>,
    ctx: Arc<RewriteContext>,
    progress: Option<&ProgressLine>,
) -> Result<usize> {
    let mut tasks = JoinSet::new();
    for path in pages {
        let store = Arc::clone(store);
        let ctx = Arc::clone(&ctx);
        tasks.spawn_blocking(move || rewrite_page(store.as_ref(), &path, &ctx));
    }

    let mut rewritten = 0;
    while let Some(joined) = tasks.join_next().await {
        joined.context("page task failed")??;
        rewritten += 1;
        if let Some(p) = progress {
            p.inc("pages");
        }
    }
    Ok(rewritten)
}

/// Rewrite one HTML route in place. HTML routes are never renamed.
fn rewrite_page(store: &dyn RouteStore, path: &str, ctx: &RewriteContext) -> Result<()> {
    let content = store.get(path)?;
    let html = String::from_utf8_lossy(&content);
    let rewritten = rewrite_document(path, &html, ctx)?;

    let output = if ctx.minify {
        minify_html(&rewritten)
    } else {
        rewritten.into_bytes()
    };
    store.set(path, output)?;
    Ok(())
}

/// Write `original → hashed` pairs as sorted JSON.
fn write_manifest(store: &dyn RouteStore, path: &str, remap: &RemapTable) -> Result<()> {
    let json = serde_json::to_vec_pretty(&remap.sorted()).context("failed to encode manifest")?;
    store.set(path, json)?;
    log!("build"; "manifest written to {}", path);
    Ok(())
}
