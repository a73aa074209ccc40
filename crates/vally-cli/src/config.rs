mod builder;
mod defaults;
mod file;
mod models;

pub use builder::{ConfigSources, build_config};
