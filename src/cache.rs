//! Content-addressed cache of built artifacts.
//!
//! Keys hash the membership matrix and the build options, so a changed input
//! can never be served a stale graph. The builder itself never reads the cache.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};
use xxhash_rust::xxh3::Xxh3;

use crate::error::{GraphError, Result};
use crate::graph::{GraphArtifact, GraphBuilder, MembershipMatrix};
use crate::io::artifact::{load_artifact, save_artifact};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey(u64);

impl CacheKey {
    #[must_use]
    pub fn of(membership: &MembershipMatrix, builder: &GraphBuilder) -> Self {
        let mut hasher = Xxh3::new();
        hasher.update(&(membership.num_nodes() as u64).to_le_bytes());
        hasher.update(&(membership.num_samples() as u64).to_le_bytes());
        let bins = membership.view();
        match bins.as_slice() {
            Some(bytes) => hasher.update(bytes),
            None => {
                for bit in &bins {
                    hasher.update(&[*bit]);
                }
            }
        }
        // Options that change the artifact. The product backend does not.
        hasher.update(builder.link_mode().as_str().as_bytes());
        Self(hasher.digest())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactCache {
    dir: PathBuf,
}

impl ArtifactCache {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn entry_path(&self, key: CacheKey) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Returns the cached artifact, or `None` on a miss.
    ///
    /// Unreadable entries count as misses.
    ///
    /// # Errors
    /// Returns [`GraphError::Io`] when the entry exists but cannot be read.
    pub fn get(&self, key: CacheKey) -> Result<Option<GraphArtifact>> {
        let path = self.entry_path(key);
        if !path.exists() {
            debug!(%key, "artifact cache miss");
            return Ok(None);
        }
        match load_artifact(&path) {
            Ok(artifact) => {
                debug!(%key, "artifact cache hit");
                Ok(Some(artifact))
            }
            Err(GraphError::Json { source, .. }) => {
                warn!(%key, error = %source, "discarding corrupt cache entry");
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    /// # Errors
    /// Returns [`GraphError::Io`] or [`GraphError::Json`] when the entry cannot be written.
    pub fn put(&self, key: CacheKey, artifact: &GraphArtifact) -> Result<()> {
        save_artifact(&self.entry_path(key), artifact, false)?;
        debug!(%key, dir = %self.dir.display(), "artifact cached");
        Ok(())
    }

    /// Cached artifact for `membership`, building and storing it on a miss.
    ///
    /// # Errors
    /// Propagates cache read and write errors.
    pub fn get_or_build(
        &self,
        membership: &MembershipMatrix,
        builder: &GraphBuilder,
    ) -> Result<GraphArtifact> {
        let key = CacheKey::of(membership, builder);
        if let Some(artifact) = self.get(key)? {
            return Ok(artifact);
        }
        let artifact = builder.build(membership);
        self.put(key, &artifact)?;
        Ok(artifact)
    }
}
