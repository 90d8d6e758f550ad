use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::{collections::BTreeMap as Map, fmt};

use crate::services::LookupError;

/// The part of an image configuration a build step works on.
///
/// Only `Env` and `User` are modelled; every other field of the document is
/// kept verbatim in `other` so it survives a load and store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageConfig {
    #[serde(
        rename = "User",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub user: String,

    #[serde(
        rename = "Env",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub env: Vec<String>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl ImageConfig {
    pub fn with_env<I, S>(env: I) -> ImageConfig
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ImageConfig {
            env: env.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// An OCI image config blob, where the runtime config sits under `config`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OciConfigRoot {
    pub config: ImageConfig,

    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// A config document as read from disk, in whichever shape it came in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigFile {
    Oci(OciConfigRoot),
    Bare(ImageConfig),
}

impl ConfigFile {
    /// Parses a config document. Empty input is an empty bare config.
    pub fn from_json(contents: &str) -> serde_json::Result<ConfigFile> {
        if contents.trim().is_empty() {
            return Ok(Default::default());
        }

        serde_json::from_str(contents)
    }

    pub fn config(&self) -> &ImageConfig {
        match self {
            ConfigFile::Oci(root) => &root.config,
            ConfigFile::Bare(config) => config,
        }
    }

    pub fn config_mut(&mut self) -> &mut ImageConfig {
        match self {
            ConfigFile::Oci(root) => &mut root.config,
            ConfigFile::Bare(config) => config,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        ConfigFile::Bare(Default::default())
    }
}

/// A `USER` argument split into its user and optional group part.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct UserSpec {
    pub user: String,
    pub group: Option<String>,
}

impl fmt::Display for UserSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.group {
            Some(group) => write!(f, "{}:{}", self.user, group),
            None => write!(f, "{}", self.user),
        }
    }
}

/// An entry from the builder's identity database.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HostUser {
    pub uid: String,
    pub gid: Option<String>,
    pub name: Option<String>,
}

/// Outcome of checking a user against the identity database.
#[derive(Debug)]
pub enum Validation {
    Verified(HostUser),
    /// The user is unknown here; it may be created by a later step or only
    /// exist in the final image.
    Skipped(LookupError),
}

impl Validation {
    pub fn is_verified(&self) -> bool {
        matches!(self, Validation::Verified(_))
    }
}
