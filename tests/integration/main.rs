//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  All tests run on the host with no bridge or
//! status API required.

mod action_tests;
mod mock_device;
mod provisioning_tests;
mod service_tests;
