//! Configuration section definitions.
//!
//! Each module corresponds to a section in `postsite.toml`:
//!
//! | Module     | TOML Section   | Purpose                                 |
//! |------------|----------------|-----------------------------------------|
//! | `build`    | `[build]`      | Output dir, CDN, hashing, rewriting     |
//! | `markdown` | `[markdown]`   | Markdown rendering extensions           |

pub mod build;
mod markdown;

pub use build::{AssetsConfig, BuildSectionConfig, FriendsConfig, RewriteConfig};
pub use markdown::MarkdownConfig;
