//! File watcher for continuous rebuilds
//!
//! Implements the watching half of the `watch` command:
//! - Three channels: stylesheets, scripts, pages
//! - Debouncing (100ms) per channel
//! - Failed rebuilds are logged, the session continues

mod event;
mod run;

pub use event::{Channel, DEBOUNCE_MS};
pub use run::FileWatcher;
