use dashmap::DashMap;

use super::{RouteError, RouteStore};

/// In-memory route store.
#[derive(Debug, Default)]
pub struct MemoryRoutes {
    routes: DashMap<String, Vec<u8>>,
}

impl MemoryRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Check whether a route exists.
    pub fn contains(&self, path: &str) -> bool {
        self.routes.contains_key(path)
    }
}

impl<P: Into<String>, C: Into<Vec<u8>>> FromIterator<(P, C)> for MemoryRoutes {
    fn from_iter<I: IntoIterator<Item = (P, C)>>(iter: I) -> Self {
        let routes = DashMap::new();
        for (path, content) in iter {
            routes.insert(path.into(), content.into());
        }
        Self { routes }
    }
}

impl RouteStore for MemoryRoutes {
    fn list(&self) -> Vec<String> {
        self.routes.iter().map(|e| e.key().clone()).collect()
    }

    fn get(&self, path: &str) -> Result<Vec<u8>, RouteError> {
        self.routes
            .get(path)
            .map(|content| content.clone())
            .ok_or_else(|| RouteError::NotFound(path.to_string()))
    }

    fn set(&self, path: &str, content: Vec<u8>) -> Result<(), RouteError> {
        self.routes.insert(path.to_string(), content);
        Ok(())
    }

    fn remove(&self, path: &str) -> Result<(), RouteError> {
        self.routes.remove(path);
        Ok(())
    }
}
