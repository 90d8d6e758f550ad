use log::{debug, info, warn};
use std::fmt;
use thiserror::Error;

use crate::{
    build_args::BuildArgs,
    models::{ImageConfig, UserSpec, Validation},
    services::UserLookup,
    shell::{self, SubstitutionError},
};

#[derive(Debug, Error)]
pub enum UserError {
    #[error("USER requires a user name or id")]
    Empty,
    #[error("USER {0:?} has more than one ':'")]
    TooManySeparators(String),
    #[error("could not substitute variables in USER: {0}")]
    Substitution(#[from] SubstitutionError),
}

/// A `USER user[:group]` directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserCommand {
    user: String,
}

impl UserCommand {
    pub fn new<S: Into<String>>(user: S) -> UserCommand {
        UserCommand { user: user.into() }
    }

    /// Substitutes variables in the directive and stores the result as the
    /// image's user.
    ///
    /// The user is looked up to check that it exists, but the outcome never
    /// changes what is stored and a failed lookup is not an error: the user
    /// may be created by a later step, or only exist in the final image.
    pub fn execute(
        &self,
        config: &mut ImageConfig,
        build_args: &BuildArgs,
        lookup: &dyn UserLookup,
    ) -> Result<Validation, UserError> {
        let spec = split_user(&self.user)?;
        let envs = build_args.replacement_envs(&config.env);

        let resolved = UserSpec {
            user: shell::expand(&spec.user, &envs)?,
            group: spec
                .group
                .as_deref()
                .map(|group| shell::expand(group, &envs))
                .transpose()?,
        };

        if resolved.user.is_empty() {
            return Err(UserError::Empty);
        }

        let validation = match lookup.lookup(&resolved.user) {
            Ok(host_user) => {
                debug!("found user {:?} as {:?}", resolved.user, host_user);
                Validation::Verified(host_user)
            }
            Err(err) => {
                warn!("could not look up user {:?}: {}", resolved.user, err);
                Validation::Skipped(err)
            }
        };

        config.user = resolved.to_string();
        info!("set image user to {:?}", config.user);

        Ok(validation)
    }
}

impl fmt::Display for UserCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "USER {}", self.user)
    }
}

/// Applies `USER raw` to `config` and returns the updated config.
pub fn resolve_user(
    mut config: ImageConfig,
    raw: &str,
    build_args: &BuildArgs,
    lookup: &dyn UserLookup,
) -> Result<ImageConfig, UserError> {
    UserCommand::new(raw).execute(&mut config, build_args, lookup)?;
    Ok(config)
}

fn split_user(raw: &str) -> Result<UserSpec, UserError> {
    let mut parts = raw.splitn(2, ':');
    let user = parts.next().unwrap_or_default();
    let group = parts.next();

    if group.map(|group| group.contains(':')).unwrap_or(false) {
        return Err(UserError::TooManySeparators(raw.into()));
    }

    Ok(UserSpec {
        user: user.into(),
        group: group.map(Into::into),
    })
}
