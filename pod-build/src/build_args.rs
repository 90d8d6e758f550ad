use log::debug;
use std::collections::{BTreeMap as Map, BTreeSet as Set};

/// Args that can be supplied without a matching `ARG` directive.
const PREDEFINED_ARGS: &[&str] = &[
    "HTTP_PROXY",
    "http_proxy",
    "HTTPS_PROXY",
    "https_proxy",
    "FTP_PROXY",
    "ftp_proxy",
    "NO_PROXY",
    "no_proxy",
    "ALL_PROXY",
    "all_proxy",
];

/// Build args supplied to a build, and the ones its `ARG` directives declared.
///
/// Only declared args (and the predefined proxy args) take part in variable
/// substitution.
#[derive(Clone, Debug, Default)]
pub struct BuildArgs {
    supplied: Map<String, String>,
    declared: Map<String, Option<String>>,
    order: Vec<String>,
}

impl BuildArgs {
    /// Creates the build args from `KEY=VALUE` strings. A bare `KEY` is
    /// supplied with an empty value.
    pub fn new<I, S>(args: I) -> BuildArgs
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let supplied = args
            .into_iter()
            .map(|arg| {
                let (key, value) = split_value(arg.into());
                (key, value.unwrap_or_default())
            })
            .collect();

        BuildArgs {
            supplied,
            ..Default::default()
        }
    }

    /// Records an `ARG key[=default]` directive.
    pub fn declare<K: Into<String>>(&mut self, key: K, default: Option<String>) {
        let key = key.into();
        debug!("declared build arg {:?} (default {:?})", key, default);

        if !self.declared.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.declared.insert(key, default);
    }

    /// Records an `ARG` directive written as `NAME` or `NAME=DEFAULT`.
    pub fn declare_arg<S: Into<String>>(&mut self, arg: S) {
        let (key, default) = split_value(arg.into());
        self.declare(key, default);
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        let default = self.declared.get(key)?;
        self.supplied
            .get(key)
            .map(String::as_str)
            .or_else(|| default.as_deref())
    }

    /// Supplied args that no `ARG` directive declared.
    pub fn unused(&self) -> Set<&str> {
        self.supplied
            .keys()
            .map(String::as_str)
            .filter(|key| {
                !self.declared.contains_key(*key) && !PREDEFINED_ARGS.iter().any(|arg| arg == key)
            })
            .collect()
    }

    /// The `KEY=VALUE` entries variables are substituted from: the build args
    /// in declaration order followed by `env`, so the image environment
    /// overrides a build arg of the same name.
    pub fn replacement_envs(&self, env: &[String]) -> Vec<String> {
        let declared = self
            .order
            .iter()
            .filter_map(|key| self.value(key).map(|value| format!("{}={}", key, value)));

        let predefined = PREDEFINED_ARGS
            .iter()
            .filter(|key| !self.declared.contains_key(**key))
            .filter_map(|key| {
                self.supplied
                    .get(*key)
                    .map(|value| format!("{}={}", key, value))
            });

        declared
            .chain(predefined)
            .chain(env.iter().cloned())
            .collect()
    }
}

fn split_value(value: String) -> (String, Option<String>) {
    let split_index = value.find('=');
    match split_index {
        Some(split_index) => {
            let (key, value) = value.split_at(split_index);
            (key.into(), Some(value[1..].into()))
        }
        None => (value, None),
    }
}
