use crate::classifier::ResolutionResult;
use bevy::prelude::*;
use bevy_persistent::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What survives the hop from the title screen to the result screen:
/// the raw job title the user typed, and (once analysis ran) the resolved
/// archetype. Mirrors the original's per-session key-value store.
#[derive(Resource, Debug, Default, Serialize, Deserialize)]
pub struct Session {
    pub job_title: Option<String>,
    pub resolution: Option<ResolutionResult>,
}

impl Session {
    /// Consume the cached resolution. One-shot on purpose: a stale entry
    /// must never be replayed after back-navigation.
    pub fn take_resolution(&mut self) -> Option<ResolutionResult> {
        self.resolution.take()
    }
}

fn storage_dir() -> PathBuf {
    if cfg!(target_family = "wasm") {
        Path::new("local").join("layoff_oracle")
    } else {
        dirs::data_dir()
            .map(|dir| dir.join("layoff_oracle"))
            .unwrap_or_else(|| Path::new("local").join("layoff_oracle"))
    }
}

/// Build the persistent session resource. Failing to set up storage at
/// startup is unrecoverable, same as a broken catalog.
pub fn setup_session() -> Persistent<Session> {
    Persistent::<Session>::builder()
        .name("session")
        .format(StorageFormat::Toml)
        .path(storage_dir().join("session.toml"))
        .default(Session::default())
        .build()
        .expect("failed to initialize session storage")
}
