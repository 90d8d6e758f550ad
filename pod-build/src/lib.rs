//! Resolution of the runtime user of an image from a `USER` directive.

pub mod backends;
pub mod build_args;
pub mod commands;
pub mod models;
pub mod services;
pub mod shell;

pub use build_args::BuildArgs;
pub use commands::{resolve_user, UserCommand, UserError};
pub use models::{ConfigFile, HostUser, ImageConfig, UserSpec, Validation};
pub use services::{LookupError, UserLookup};
