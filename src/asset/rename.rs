//! Asset fingerprint renamer.
//!
//! Each hashable route is read, transformed (friends images, SVG, optional
//! JS/CSS minify), fingerprinted and moved to `name.<fingerprint>.ext`.
//! The per-route results are gathered into a [`RemapTable`] that the HTML
//! rewriter reads afterwards.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;

use super::fingerprint::{fingerprint, is_spliced, splice};
use super::minify::minify_asset;
use crate::config::{AssetsConfig, FriendsConfig};
use crate::core::BuildMode;
use crate::debug;
use crate::image::process_friends_image;
use crate::image::svg::optimize_or_original;
use crate::route::RouteStore;
use crate::utils::path::{extension_lower, file_name, join, parent_dir};

/// Mapping of original route path → hashed route path.
///
/// Filled once by the rename stage, then only read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemapTable {
    entries: FxHashMap<String, String>,
}

impl RemapTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rename. The first entry for an original path wins.
    pub fn insert(&mut self, original: String, renamed: String) {
        self.entries.entry(original).or_insert(renamed);
    }

    pub fn get(&self, original: &str) -> Option<&str> {
        self.entries.get(original).map(String::as_str)
    }

    /// Remapped path, or `path` itself when it was never renamed.
    pub fn resolve<'a>(&'a self, path: &'a str) -> &'a str {
        self.get(path).unwrap_or(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by original path.
    pub fn sorted(&self) -> BTreeMap<&str, &str> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

impl FromIterator<(String, String)> for RemapTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (original, renamed) in iter {
            table.insert(original, renamed);
        }
        table
    }
}

/// Settings shared by every rename task.
#[derive(Debug, Clone)]
pub struct RenameContext {
    pub assets: AssetsConfig,
    pub friends: FriendsConfig,
    pub mode: BuildMode,
}

/// Rename one asset route by content fingerprint.
///
/// Returns `(original, renamed)` when the route moved, `None` when it already
/// carries the fingerprint of its content.
pub fn rename_asset(
    store: &dyn RouteStore,
    path: &str,
    ctx: &RenameContext,
) -> Result<Option<(String, String)>> {
    let raw = store.get(path)?;

    let name = file_name(path);
    if is_spliced(name, &fingerprint(&raw)) {
        debug!("hash"; "{} already fingerprinted", path);
        return Ok(None);
    }

    let (name, content) = if ctx.friends.contains(path) {
        process_friends_image(name, raw).with_context(|| format!("failed to transform `{path}`"))?
    } else {
        (name.to_string(), raw)
    };

    let content = match extension_lower(&name).as_str() {
        ".svg" => optimize_or_original(path, content),
        ".js" | ".css" if ctx.assets.minify && ctx.mode.minify() => {
            minify_asset(&name, &content).unwrap_or(content)
        }
        _ => content,
    };

    let hashed = join(parent_dir(path), &splice(&name, &fingerprint(&content)));

    store.remove(path)?;
    store.set(&hashed, content)?;

    debug!("hash"; "{} -> {}", path, hashed);
    Ok(Some((path.to_string(), hashed)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::MemoryRoutes;
    use image::{DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn ctx() -> RenameContext {
        RenameContext {
            assets: AssetsConfig::default(),
            friends: FriendsConfig::default(),
            mode: BuildMode::PRODUCTION,
        }
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([30, 60, 90, 255]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_rename_css() {
        let store = MemoryRoutes::from_iter([("css/style.css", "body { color: red; }")]);
        let (original, renamed) = rename_asset(&store, "css/style.css", &ctx()).unwrap().unwrap();

        let fp = fingerprint(b"body { color: red; }");
        assert_eq!(original, "css/style.css");
        assert_eq!(renamed, format!("css/style.{fp}.css"));
        assert!(!store.contains("css/style.css"));
        assert_eq!(store.get(&renamed).unwrap(), b"body { color: red; }");
    }

    #[test]
    fn test_rename_keeps_extra_segments() {
        let store = MemoryRoutes::from_iter([("main.min.js", "let a=1;")]);
        let (_, renamed) = rename_asset(&store, "main.min.js", &ctx()).unwrap().unwrap();
        assert_eq!(renamed, format!("main.{}.min.js", fingerprint(b"let a=1;")));
    }

    #[test]
    fn test_rename_is_idempotent() {
        let store = MemoryRoutes::from_iter([("a.js", "console.log(1)")]);
        let (_, renamed) = rename_asset(&store, "a.js", &ctx()).unwrap().unwrap();

        assert!(rename_asset(&store, &renamed, &ctx()).unwrap().is_none());
        assert_eq!(store.list(), vec![renamed]);
    }

    #[test]
    fn test_identical_content_same_fingerprint() {
        let store = MemoryRoutes::from_iter([("a/x.png", "same"), ("b/y.png", "same")]);
        let (_, a) = rename_asset(&store, "a/x.png", &ctx()).unwrap().unwrap();
        let (_, b) = rename_asset(&store, "b/y.png", &ctx()).unwrap().unwrap();
        assert_eq!(a.split('.').nth(1), b.split('.').nth(1));
    }

    #[test]
    fn test_friends_banner_renamed() {
        let store = MemoryRoutes::new();
        store.set("friends/alice/banner.5.png", png(600, 100)).unwrap();

        let (original, renamed) = rename_asset(&store, "friends/alice/banner.5.png", &ctx())
            .unwrap()
            .unwrap();
        assert_eq!(original, "friends/alice/banner.5.png");
        assert!(renamed.starts_with("friends/alice/banner."));
        assert!(renamed.ends_with(".jpg"));

        let content = store.get(&renamed).unwrap();
        assert_eq!(renamed, format!("friends/alice/banner.{}.jpg", fingerprint(&content)));
        let img = image::load_from_memory(&content).unwrap();
        assert_eq!(img.dimensions(), (870, 255));

        // Second pass sees the fingerprinted banner and leaves it alone.
        assert!(rename_asset(&store, &renamed, &ctx()).unwrap().is_none());
    }

    #[test]
    fn test_friends_prefix_only_at_root() {
        let store = MemoryRoutes::new();
        let content = png(10, 10);
        store.set("posts/friends/avatar.png", content.clone()).unwrap();

        let (_, renamed) = rename_asset(&store, "posts/friends/avatar.png", &ctx())
            .unwrap()
            .unwrap();
        assert_eq!(store.get(&renamed).unwrap(), content);
    }

    #[test]
    fn test_bad_friends_image_is_fatal() {
        let store = MemoryRoutes::from_iter([("friends/bob/avatar.png", "not a png")]);
        let err = rename_asset(&store, "friends/bob/avatar.png", &ctx()).unwrap_err();
        assert!(format!("{err:#}").contains("friends/bob/avatar.png"));
        assert!(store.contains("friends/bob/avatar.png"));
    }

    #[test]
    fn test_broken_svg_kept() {
        let store = MemoryRoutes::from_iter([("icon.svg", "<svg")]);
        let (_, renamed) = rename_asset(&store, "icon.svg", &ctx()).unwrap().unwrap();
        assert_eq!(store.get(&renamed).unwrap(), b"<svg");
    }

    #[test]
    fn test_minify_only_outside_preview() {
        let source = "body {\n  color: red;\n}\n";
        let mut ctx = ctx();
        ctx.assets.minify = true;

        let store = MemoryRoutes::from_iter([("style.css", source)]);
        let (_, renamed) = rename_asset(&store, "style.css", &ctx).unwrap().unwrap();
        assert_eq!(store.get(&renamed).unwrap(), b"body{color:red}");

        ctx.mode = BuildMode::PREVIEW;
        let store = MemoryRoutes::from_iter([("style.css", source)]);
        let (_, renamed) = rename_asset(&store, "style.css", &ctx).unwrap().unwrap();
        assert_eq!(store.get(&renamed).unwrap(), source.as_bytes());
    }

    #[test]
    fn test_missing_route_errors() {
        let store = MemoryRoutes::new();
        assert!(rename_asset(&store, "gone.css", &ctx()).is_err());
    }

    #[test]
    fn test_remap_table() {
        let mut table = RemapTable::new();
        table.insert("a.png".into(), "a.11111111.png".into());
        table.insert("a.png".into(), "a.22222222.png".into());
        assert_eq!(table.get("a.png"), Some("a.11111111.png"));
        assert_eq!(table.resolve("b.png"), "b.png");
        assert_eq!(table.len(), 1);

        let table: RemapTable = [
            ("z.css".to_string(), "z.1.css".to_string()),
            ("a.css".to_string(), "a.1.css".to_string()),
        ]
        .into_iter()
        .collect();
        let keys: Vec<_> = table.sorted().into_keys().collect();
        assert_eq!(keys, vec!["a.css", "z.css"]);
    }
}
