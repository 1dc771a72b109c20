//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements   | Connects to                     |
//! |---------------|--------------|---------------------------------|
//! | `hue`         | DevicePort   | Hue bridge REST API             |
//! |               | PairingPort  | Bridge discovery / registration |
//! | `sentry_api`  | IssueSource  | Sentry REST API                 |
//! | `config_file` | ConfigPort   | JSON config document on disk    |
//! | `log_sink`    | EventSink    | `log` facade                    |
//! | `time`        | DelayPort    | `async-io-mini` timer reactor   |
//!
//! `offload` runs the blocking HTTP calls on worker threads.

pub mod config_file;
pub mod hue;
pub mod log_sink;
pub(crate) mod offload;
pub mod sentry_api;
pub mod time;
