use log::debug;
use std::{fs, path::PathBuf};

use crate::{
    backends::numeric_user,
    models::HostUser,
    services::{LookupError, UserLookup},
};

/// Looks users up in a passwd(5) formatted file, such as the `/etc/passwd`
/// of an unpacked root filesystem.
#[derive(Clone, Debug)]
pub struct PasswdLookup {
    path: PathBuf,
}

struct PasswdEntry<'a> {
    name: &'a str,
    uid: &'a str,
    gid: &'a str,
}

impl PasswdLookup {
    pub fn new<P: Into<PathBuf>>(path: P) -> PasswdLookup {
        PasswdLookup { path: path.into() }
    }
}

impl UserLookup for PasswdLookup {
    fn lookup(&self, name: &str) -> Result<HostUser, LookupError> {
        let contents = fs::read_to_string(&self.path)?;
        let entries = contents.lines().filter_map(parse_line).collect::<Vec<_>>();

        let by_name = entries.iter().find(|entry| entry.name == name);
        let entry = match by_name {
            Some(entry) => Some(entry),
            None if name.parse::<u32>().is_ok() => {
                debug!("no user named {:?} in {:?}, trying it as a uid", name, self.path);
                entries.iter().find(|entry| entry.uid == name)
            }
            None => None,
        };

        match entry {
            Some(entry) => Ok(HostUser {
                uid: entry.uid.into(),
                gid: Some(entry.gid.into()),
                name: Some(entry.name.into()),
            }),
            None => numeric_user(name).ok_or_else(|| LookupError::NotFound(name.into())),
        }
    }
}

fn parse_line(line: &str) -> Option<PasswdEntry<'_>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let mut fields = line.split(':');
    let name = fields.next()?;
    let _password = fields.next()?;
    let uid = fields.next()?;
    let gid = fields.next()?;

    if name.is_empty() || uid.is_empty() {
        return None;
    }

    Some(PasswdEntry { name, uid, gid })
}
