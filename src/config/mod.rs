//! Configuration and path management

pub mod paths;
pub mod settings;

pub use paths::GuardPaths;
pub use settings::Settings;
