//! Render mode for production/live-preview runs.

/// Render mode, fixed for the lifetime of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildMode {
    /// Live preview: skip CDN prefixing, scheme stripping and minification.
    pub live_preview: bool,
}

impl BuildMode {
    /// Production mode: CDN-prefixed, scheme-stripped, minified output.
    pub const PRODUCTION: Self = Self {
        live_preview: false,
    };

    /// Live preview mode: site-root URLs, unminified output.
    pub const PREVIEW: Self = Self { live_preview: true };

    /// Whether rewritten URLs should carry the CDN origin.
    #[inline]
    pub const fn use_cdn(&self) -> bool {
        !self.live_preview
    }

    /// Whether emitted HTML should go through the minifier.
    #[inline]
    pub const fn minify(&self) -> bool {
        !self.live_preview
    }

    /// Whether `https:` should be stripped to protocol-relative form.
    #[inline]
    pub const fn strip_scheme(&self) -> bool {
        !self.live_preview
    }
}

impl Default for BuildMode {
    fn default() -> Self {
        Self::PRODUCTION
    }
}
