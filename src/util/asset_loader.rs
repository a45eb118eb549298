use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use minijinja::{Environment, Error, State};
use sha2::{Digest, Sha256};

/// `asset("app.css")` in templates resolves to `/static/app.css?v=<sha256>`
/// so browsers refetch after a change. Hashes are computed once per path.
#[derive(Debug, Clone)]
pub struct AssetLoader {
    root: PathBuf,
    cache: Arc<RwLock<HashMap<String, String>>>,
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new("static")
    }
}

impl AssetLoader {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn asset_path(&self, path: &str) -> String {
        if let Some(hashed) = self.cache.read().ok().and_then(|c| c.get(path).cloned()) {
            return hashed;
        }

        let Ok(contents) = fs::read(self.root.join(path)) else {
            return format!("/static/{path}");
        };
        let hash = Sha256::digest(contents);
        let hashed = format!("/static/{path}?v={hash:x}");
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(path.to_string(), hashed.clone());
        }
        hashed
    }

    pub fn register(&self, env: &mut Environment<'_>) {
        let loader = self.clone();
        env.add_function(
            "asset",
            move |_state: &State, path: String| -> Result<String, Error> {
                Ok(loader.asset_path(&path))
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_served_unversioned() {
        let loader = AssetLoader::new("does-not-exist");
        assert_eq!(loader.asset_path("app.css"), "/static/app.css");
    }

    #[test]
    fn existing_file_gets_a_stable_hash() {
        let dir = std::env::temp_dir().join(format!("assets-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("app.css"), "body{}").unwrap();

        let loader = AssetLoader::new(&dir);
        let first = loader.asset_path("app.css");
        assert!(first.starts_with("/static/app.css?v="));
        assert_eq!(loader.asset_path("app.css"), first);

        fs::remove_dir_all(dir).unwrap();
    }
}
