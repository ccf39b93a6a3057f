//! Route store: the generated site as a mapping of path → bytes.
//!
//! The post-processing stages only depend on [`RouteStore`]; how routes were
//! produced (in memory, on disk) is up to the implementation.
//!
//! - [`MemoryRoutes`]: concurrent in-memory map
//! - [`DiskRoutes`]: files under an output directory

mod disk;
mod memory;

use std::io;

use thiserror::Error;

pub use disk::DiskRoutes;
pub use memory::MemoryRoutes;

/// Route store errors.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route not found: `{0}`")]
    NotFound(String),

    #[error("IO error on route `{path}`")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Read/write access to the generated routes.
///
/// Paths are site-relative and `/`-separated. Implementations must allow
/// concurrent calls on disjoint paths.
pub trait RouteStore: Send + Sync {
    /// All route paths currently in the store, in no particular order.
    fn list(&self) -> Vec<String>;

    /// Full content of a route.
    fn get(&self, path: &str) -> Result<Vec<u8>, RouteError>;

    /// Insert or replace a route.
    fn set(&self, path: &str, content: Vec<u8>) -> Result<(), RouteError>;

    /// Remove a route. Removing a missing route is not an error.
    fn remove(&self, path: &str) -> Result<(), RouteError>;
}
