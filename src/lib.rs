//! sshq - SSH host launcher driven by your ssh client config.
//!
//! Host aliases are collected from `Host` lines of the system and user ssh
//! config files (following `Include`). Queries of the form
//! `[user@]<host> [script]` are matched by case-insensitive prefix and each
//! match carries a ready-to-run terminal command line.
//!
//! ```no_run
//! use sshq::app::AppState;
//! use sshq::config::Config;
//! use sshq::settings::Templates;
//!
//! let config = Config::default();
//! let app = AppState::new(&config, Templates::in_memory());
//!
//! for item in app.handle_query("alice@web uptime", true) {
//!     println!("{:.2} {} -> {}", item.score, item.text, item.actions[0].command);
//! }
//! ```

pub mod app;
pub mod config;
pub mod query;
pub mod ranker;
pub mod settings;
pub mod ssh;
pub mod template;
