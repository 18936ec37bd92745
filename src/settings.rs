// src/settings.rs
//! Settings read by the Camel language server.
//!
//! The runtime provider picks which Camel catalog the server completes
//! against. It is a single process-wide value, so every temporary change goes
//! through [`RuntimeProviderOverride`], which puts the previous value back.

use std::fmt;
use std::fs;
use std::io;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use json_comments::StripComments;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const LANGUAGE_SERVER_ID: &str = "camel-lsp-server";
pub const SETTINGS_SECTION: &str = "camel";
pub const RUNTIME_PROVIDER_KEY: &str = "Camel catalog runtime provider";
pub const CATALOG_VERSION_KEY: &str = "Camel catalog version";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuntimeProvider {
    Default,
    SpringBoot,
    Quarkus,
    Karaf,
}

impl RuntimeProvider {
    pub const ALL: [RuntimeProvider; 4] = [
        RuntimeProvider::Default,
        RuntimeProvider::SpringBoot,
        RuntimeProvider::Quarkus,
        RuntimeProvider::Karaf,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RuntimeProvider::Default => "DEFAULT",
            RuntimeProvider::SpringBoot => "SPRINGBOOT",
            RuntimeProvider::Quarkus => "QUARKUS",
            RuntimeProvider::Karaf => "KARAF",
        }
    }
}

impl fmt::Display for RuntimeProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown runtime provider `{0}` (expected DEFAULT, SPRINGBOOT, QUARKUS or KARAF)")]
pub struct UnknownRuntimeProvider(pub String);

impl FromStr for RuntimeProvider {
    type Err = UnknownRuntimeProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownRuntimeProvider(s.to_string()))
    }
}

/// The `camel` settings section understood by the language server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CamelSettings {
    #[serde(
        rename = "Camel catalog version",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub catalog_version: Option<String>,
    #[serde(
        rename = "Camel catalog runtime provider",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub runtime_provider: Option<RuntimeProvider>,
}

impl CamelSettings {
    /// Reads either `{"camel": {..}}` or the bare section. Malformed values
    /// are logged and treated as unset.
    pub fn from_settings(value: &Value) -> Self {
        let section = value.get(SETTINGS_SECTION).unwrap_or(value);
        match serde_json::from_value(section.clone()) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("ignoring malformed Camel settings: {e}");
                Self::default()
            }
        }
    }

    /// Configuration object sent to the language server. Unset keys are
    /// omitted rather than nulled, so clearing a value reproduces the
    /// configuration the server started with.
    pub fn workspace_configuration(&self) -> Value {
        let mut section = Map::new();
        if let Some(version) = &self.catalog_version {
            section.insert(CATALOG_VERSION_KEY.into(), Value::String(version.clone()));
        }
        if let Some(provider) = self.runtime_provider {
            section.insert(RUNTIME_PROVIDER_KEY.into(), provider.as_str().into());
        }
        let mut root = Map::new();
        root.insert(SETTINGS_SECTION.into(), Value::Object(section));
        Value::Object(root)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to access settings file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("settings file {path} is not valid JSON")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("settings file {path} does not hold a JSON object at `{key}`")]
    NotAnObject { path: PathBuf, key: String },
}

/// Store holding the runtime provider setting.
pub trait SettingsStore {
    fn runtime_provider(&self) -> Result<Option<RuntimeProvider>, SettingsError>;
    fn set_runtime_provider(&mut self, provider: RuntimeProvider) -> Result<(), SettingsError>;
    fn clear_runtime_provider(&mut self) -> Result<(), SettingsError>;

    /// Sets `provider` until the returned guard is dropped.
    fn override_runtime_provider(
        &mut self,
        provider: RuntimeProvider,
    ) -> Result<RuntimeProviderOverride<'_, Self>, SettingsError>
    where
        Self: Sized,
    {
        let previous = self.runtime_provider()?;
        self.set_runtime_provider(provider)?;
        Ok(RuntimeProviderOverride {
            store: self,
            previous,
        })
    }
}

/// Restores the runtime provider that was in place when it was created.
pub struct RuntimeProviderOverride<'a, S: SettingsStore> {
    store: &'a mut S,
    previous: Option<RuntimeProvider>,
}

impl<S: SettingsStore> RuntimeProviderOverride<'_, S> {
    pub fn previous(&self) -> Option<RuntimeProvider> {
        self.previous
    }
}

impl<S: SettingsStore> Deref for RuntimeProviderOverride<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        &*self.store
    }
}

impl<S: SettingsStore> Drop for RuntimeProviderOverride<'_, S> {
    fn drop(&mut self) {
        let restored = match self.previous {
            Some(provider) => self.store.set_runtime_provider(provider),
            None => self.store.clear_runtime_provider(),
        };
        if let Err(e) = restored {
            log::error!("failed to restore Camel runtime provider: {e}");
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySettings {
    pub camel: CamelSettings,
}

impl SettingsStore for MemorySettings {
    fn runtime_provider(&self) -> Result<Option<RuntimeProvider>, SettingsError> {
        Ok(self.camel.runtime_provider)
    }

    fn set_runtime_provider(&mut self, provider: RuntimeProvider) -> Result<(), SettingsError> {
        self.camel.runtime_provider = Some(provider);
        Ok(())
    }

    fn clear_runtime_provider(&mut self) -> Result<(), SettingsError> {
        self.camel.runtime_provider = None;
        Ok(())
    }
}

/// Zed-style `settings.json`, editing
/// `lsp.camel-lsp-server.settings.camel` and leaving every other key alone.
///
/// Comments are accepted when reading. Writing emits plain JSON, so comments
/// in the file do not survive a change.
#[derive(Debug, Clone)]
pub struct JsonSettings {
    path: PathBuf,
}

const SECTION_PATH: [&str; 4] = ["lsp", LANGUAGE_SERVER_ID, "settings", SETTINGS_SECTION];

impl JsonSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<root>/.zed/settings.json`
    pub fn for_project(root: &Path) -> Self {
        Self::new(root.join(".zed").join("settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn camel_settings(&self) -> Result<CamelSettings, SettingsError> {
        let doc = self.load()?;
        let section = SECTION_PATH.iter().try_fold(&doc, |v, key| v.get(*key));
        Ok(section.map(CamelSettings::from_settings).unwrap_or_default())
    }

    fn load(&self) -> Result<Value, SettingsError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Value::Object(Map::new())),
            Err(source) => {
                return Err(SettingsError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if text.trim().is_empty() {
            return Ok(Value::Object(Map::new()));
        }
        // Zed settings are JSONC. Comments are blanked in place, so error
        // positions still point into the original text.
        serde_json::from_reader(StripComments::new(text.as_bytes())).map_err(|source| {
            SettingsError::Parse {
                path: self.path.clone(),
                source,
            }
        })
    }

    fn store(&self, doc: &Value) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let mut text = serde_json::to_string_pretty(doc).map_err(|source| SettingsError::Parse {
            path: self.path.clone(),
            source,
        })?;
        text.push('\n');
        fs::write(&self.path, text).map_err(io_err)
    }

    fn update(&self, f: impl FnOnce(&mut Map<String, Value>)) -> Result<(), SettingsError> {
        let mut doc = self.load()?;
        let mut current = &mut doc;
        for key in SECTION_PATH {
            let object = current
                .as_object_mut()
                .ok_or_else(|| SettingsError::NotAnObject {
                    path: self.path.clone(),
                    key: key.to_string(),
                })?;
            current = object
                .entry(key)
                .or_insert_with(|| Value::Object(Map::new()));
        }
        let section = current
            .as_object_mut()
            .ok_or_else(|| SettingsError::NotAnObject {
                path: self.path.clone(),
                key: SETTINGS_SECTION.to_string(),
            })?;
        f(section);
        self.store(&doc)
    }
}

impl SettingsStore for JsonSettings {
    fn runtime_provider(&self) -> Result<Option<RuntimeProvider>, SettingsError> {
        Ok(self.camel_settings()?.runtime_provider)
    }

    fn set_runtime_provider(&mut self, provider: RuntimeProvider) -> Result<(), SettingsError> {
        log::debug!("setting {RUNTIME_PROVIDER_KEY} to {provider} in {}", self.path.display());
        self.update(|section| {
            section.insert(RUNTIME_PROVIDER_KEY.into(), provider.as_str().into());
        })
    }

    fn clear_runtime_provider(&mut self) -> Result<(), SettingsError> {
        log::debug!("clearing {RUNTIME_PROVIDER_KEY} in {}", self.path.display());
        self.update(|section| {
            section.remove(RUNTIME_PROVIDER_KEY);
        })
    }
}
