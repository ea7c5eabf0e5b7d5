use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    messages: HashMap<String, String>,
    avatars: HashMap<String, String>,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a>(map: &'a HashMap<String, String>, kind: &str, name: &str) -> Result<&'a str> {
    map.get(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

/// Conversation records with animation, expression and lip-sync payloads.
pub mod messages {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.messages.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        read_to_string(lookup(&MANIFEST.messages, "message", name)?)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        load_json(lookup(&MANIFEST.messages, "message", name)?)
    }
}

/// Avatar manifests: mesh morph dictionaries and clip lists.
pub mod avatars {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.avatars.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        read_to_string(lookup(&MANIFEST.avatars, "avatar", name)?)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        load_json(lookup(&MANIFEST.avatars, "avatar", name)?)
    }

    /// Directory the avatar manifests live in, for file-based loaders.
    pub fn dir() -> PathBuf {
        resolve_path("avatars")
    }

    /// File name of an avatar manifest relative to `dir()`.
    pub fn file_name(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.avatars, "avatar", name)?;
        Path::new(rel)
            .file_name()
            .and_then(|f| f.to_str())
            .map(str::to_string)
            .ok_or_else(|| anyhow!("avatar fixture '{name}' has no file name"))
    }
}
