#![forbid(unsafe_code)]

//! On-device cycle tracking: cycle-phase classification, fertility-window
//! and conception-window detection, cycle-health analysis, and an encrypted
//! local store for the logs that feed them.

pub mod conception;
pub mod config;
pub mod crypto;
pub mod error;
pub mod health;
pub mod logging;
pub mod models;
pub mod phase;
pub mod prediction;
pub mod storage;
pub mod tracker;

pub use conception::{detect_conception_window, estimated_due_date};
pub use config::Config;
pub use error::{Error, Result};
pub use health::{analyze_cycle_health, analyze_cycle_health_with_age};
pub use models::*;
pub use phase::{classify_day, cycle_day_number, elapsed_cycle_day, to_local_date};
pub use storage::Store;
pub use tracker::{parse_date, Tracker};
