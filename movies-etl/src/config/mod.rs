//! Configuration and dependency wiring.

pub mod dependencies;
pub mod settings;

pub use dependencies::Dependencies;
pub use settings::SyncSettings;
