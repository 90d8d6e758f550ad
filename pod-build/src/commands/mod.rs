pub use user::{resolve_user, UserCommand, UserError};

mod user;
