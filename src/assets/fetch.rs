//! Capabilities the engine consumes from its host: raw fetch, URL resolution, voice-file
//! disambiguation and story-to-script resolution.

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use anyhow::Context;
use futures::future::{BoxFuture, FutureExt};
use serde::de::DeserializeOwned;

use crate::foundation::error::{StageError, StageResult};

/// Raw GET of an absolute asset URL.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> BoxFuture<'static, StageResult<Vec<u8>>>;
}

/// Fetch `url` and parse the body as JSON.
pub async fn fetch_json<T: DeserializeOwned>(fetcher: &dyn Fetcher, url: &str) -> StageResult<T> {
    let bytes = fetcher.fetch(url).await?;
    serde_json::from_slice(&bytes).map_err(|e| StageError::serde(format!("{url}: {e}")))
}

/// Maps a relative asset path to an absolute, fetchable URL.
pub trait AssetUrlResolver: Send + Sync {
    fn resolve(&self, rel: &str) -> String;
}

/// Rewrites a requested voice path to a file that actually exists.
pub trait VoiceLocator: Send + Sync {
    fn locate(&self, path: String) -> BoxFuture<'static, String>;
}

/// Which story the host wants to play.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoryKey {
    pub story_type: String,
    pub story_id: String,
    pub region: String,
}

/// Resolved script location plus the flags that shape voice paths.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoryRef {
    /// Relative path of the scenario JSON.
    pub scenario_url: String,
    pub is_card_story: bool,
    pub is_action_set: bool,
}

pub trait ScenarioResolver {
    fn resolve(&self, key: &StoryKey) -> StageResult<StoryRef>;
}

impl<F> ScenarioResolver for F
where
    F: Fn(&StoryKey) -> StageResult<StoryRef>,
{
    fn resolve(&self, key: &StoryKey) -> StageResult<StoryRef> {
        self(key)
    }
}

/// Serves assets from a local directory mirror of the asset bucket.
#[derive(Clone, Debug)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Fetcher for FsFetcher {
    fn fetch(&self, url: &str) -> BoxFuture<'static, StageResult<Vec<u8>>> {
        let path = self.root.join(url.trim_start_matches('/'));
        async move {
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("read asset '{}'", path.display()))?;
            Ok::<_, StageError>(bytes)
        }
        .boxed()
    }
}

/// In-memory fetcher, keyed by URL.
#[derive(Clone, Debug, Default)]
pub struct MemoryFetcher {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        if let Ok(mut files) = self.files.lock() {
            files.insert(url.into(), bytes.into());
        }
    }
}

impl Fetcher for MemoryFetcher {
    fn fetch(&self, url: &str) -> BoxFuture<'static, StageResult<Vec<u8>>> {
        let found = self
            .files
            .lock()
            .ok()
            .and_then(|files| files.get(url).cloned());
        let url = url.to_owned();
        async move { found.ok_or_else(|| StageError::asset(format!("not found: {url}"))) }.boxed()
    }
}

/// Joins relative paths onto a fixed base.
#[derive(Clone, Debug, Default)]
pub struct PrefixResolver {
    prefix: String,
}

impl PrefixResolver {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl AssetUrlResolver for PrefixResolver {
    fn resolve(&self, rel: &str) -> String {
        let rel = rel.trim_start_matches('/');
        if self.prefix.is_empty() {
            rel.to_owned()
        } else {
            format!("{}/{rel}", self.prefix.trim_end_matches('/'))
        }
    }
}

/// Returns every voice path unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityVoiceLocator;

impl VoiceLocator for IdentityVoiceLocator {
    fn locate(&self, path: String) -> BoxFuture<'static, String> {
        futures::future::ready(path).boxed()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;
