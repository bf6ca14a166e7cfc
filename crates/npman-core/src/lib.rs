//! Configuration model and plugin-folder state for the npman panel.

mod baseline;
mod config;
mod discovery;
mod loader;
mod state;
mod store_json;

pub use baseline::*;
pub use config::*;
pub use discovery::*;
pub use loader::*;
pub use state::*;
pub use store_json::*;
