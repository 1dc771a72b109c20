//! Device-level representations shared by the actions and the bridge
//! adapter.

pub mod light_state;
