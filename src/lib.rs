pub mod cli;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod sources;
pub mod utils;

pub use cli::{Cli, Handler};
pub use error::HandlerError;
