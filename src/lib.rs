//! Light Notifier library.
//!
//! Exposes the engine (config resolution, checkers, state dispatch,
//! actions) and its adapters for the binary and for integration testing.

#![deny(unused_must_use)]

pub mod actions;
pub mod adapters;
pub mod app;
pub mod checkers;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod drivers;
pub mod error;
pub mod merge;
pub mod provision;
