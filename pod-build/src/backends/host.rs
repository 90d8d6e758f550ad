use log::debug;
use nix::unistd::{Uid, User};

use crate::{
    backends::numeric_user,
    models::HostUser,
    services::{LookupError, UserLookup},
};

/// Looks users up in the identity database of the machine running the build.
#[derive(Clone, Copy, Debug, Default)]
pub struct HostLookup;

impl HostLookup {
    pub fn new() -> HostLookup {
        HostLookup
    }
}

impl UserLookup for HostLookup {
    fn lookup(&self, name: &str) -> Result<HostUser, LookupError> {
        match User::from_name(name) {
            Ok(Some(user)) => return Ok(host_user(user)),
            Ok(None) => (),
            Err(err) if name.parse::<u32>().is_err() => {
                return Err(LookupError::Backend(err.to_string()))
            }
            Err(err) => debug!("looking up user {:?} by name failed: {}", name, err),
        }

        let uid = match name.parse::<u32>() {
            Ok(uid) => uid,
            Err(_) => return Err(LookupError::NotFound(name.into())),
        };

        debug!("no user named {:?}, trying it as a uid", name);

        match User::from_uid(Uid::from_raw(uid)) {
            Ok(Some(user)) => Ok(host_user(user)),
            Ok(None) | Err(_) => {
                numeric_user(name).ok_or_else(|| LookupError::NotFound(name.into()))
            }
        }
    }
}

fn host_user(user: User) -> HostUser {
    HostUser {
        uid: user.uid.to_string(),
        gid: Some(user.gid.to_string()),
        name: Some(user.name),
    }
}
