//! Application core — domain orchestration, zero direct I/O.
//!
//! This module contains the run loop of the notifier: selecting checker
//! entries, classifying, resolving states and executing actions.  All
//! interaction with the network happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without a real bridge.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
