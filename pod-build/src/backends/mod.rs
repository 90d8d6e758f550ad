use crate::models::HostUser;

pub use host::HostLookup;
pub use passwd::PasswdLookup;

mod host;
mod passwd;

/// A numeric uid is usable even without a database entry.
fn numeric_user(name: &str) -> Option<HostUser> {
    name.parse::<u32>().ok().map(|uid| HostUser {
        uid: uid.to_string(),
        gid: None,
        name: None,
    })
}
