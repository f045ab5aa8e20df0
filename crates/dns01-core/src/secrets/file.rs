// # File Secret Store
//
// Reads secrets from a directory tree laid out the way mounted secret
// volumes are:
//
// ```text
// <root>/<namespace>/<name>/<key>
// ```
//
// Each regular file under a secret directory is one key; its contents are the
// value. Entries whose name starts with `.` (volume bookkeeping such as
// `..data`) are skipped.
//
// ## Read-through
//
// Nothing is cached. Every lookup hits the filesystem so rotated credentials
// are picked up by the next challenge. The loose-permission warning is the
// exception: it is logged once per key file.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::fs;

use crate::Error;
use crate::config::SecretStoreConfig;
use crate::traits::secret_store::{Secret, SecretStore, SecretStoreFactory};

/// Directory-backed secret store
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    root: PathBuf,
    warned: Arc<Mutex<HashSet<PathBuf>>>,
}

impl FileSecretStore {
    /// Create a store rooted at `root`
    ///
    /// The directory does not need to exist yet; lookups against a missing
    /// tree simply find nothing.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            warned: Arc::default(),
        }
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn secret_dir(&self, namespace: &str, name: &str) -> Result<PathBuf, Error> {
        check_component("namespace", namespace)?;
        check_component("secret name", name)?;
        Ok(self.root.join(namespace).join(name))
    }

    /// True the first time `path` is seen
    fn first_warning(&self, path: &Path) -> bool {
        self.warned
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_path_buf())
    }

    async fn read_key(&self, path: &Path) -> Result<Vec<u8>, Error> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mode = fs::metadata(path).await?.permissions().mode() & 0o777;
            if mode & 0o077 != 0 && self.first_warning(path) {
                tracing::warn!(
                    path = %path.display(),
                    mode = format!("{:o}", mode),
                    "Secret file is readable by group or others"
                );
            }
        }

        let mut value = fs::read(path).await?;
        while matches!(value.last(), Some(b'\n') | Some(b'\r')) {
            value.pop();
        }
        Ok(value)
    }
}

// Namespaces and names come from challenge requests; they must stay one
// path component below the root.
fn check_component(what: &str, value: &str) -> Result<(), Error> {
    if value.is_empty()
        || value == "."
        || value == ".."
        || value.contains('/')
        || value.contains('\\')
    {
        return Err(Error::credential(format!("invalid {}: {:?}", what, value)));
    }
    Ok(())
}

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>, Error> {
        let dir = self.secret_dir(namespace, name)?;

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(dir = %dir.display(), "Secret directory not found");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let mut secret = Secret::new(name);
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(key) = file_name.to_str() else {
                continue;
            };
            if key.starts_with('.') {
                continue;
            }

            let path = entry.path();
            // Follows symlinks, which is how mounted volumes expose keys
            if !fs::metadata(&path).await?.is_file() {
                continue;
            }

            let value = self.read_key(&path).await?;
            secret.data.insert(key.to_string(), value);
        }

        Ok(Some(secret))
    }

    fn store_name(&self) -> &'static str {
        "file"
    }
}

/// Factory for [`FileSecretStore`]
#[derive(Debug, Default)]
pub struct FileSecretStoreFactory;

#[async_trait]
impl SecretStoreFactory for FileSecretStoreFactory {
    async fn create(&self, config: &serde_json::Value) -> Result<Box<dyn SecretStore>, Error> {
        let config: SecretStoreConfig = serde_json::from_value(config.clone())?;
        match config {
            SecretStoreConfig::File { path } => {
                if path.is_empty() {
                    return Err(Error::config("File secret store path cannot be empty"));
                }
                tracing::debug!(path = %path, "Using file secret store");
                Ok(Box::new(FileSecretStore::new(path)))
            }
            other => Err(Error::config(format!(
                "File secret store factory cannot build a {} store",
                other.type_name()
            ))),
        }
    }
}
