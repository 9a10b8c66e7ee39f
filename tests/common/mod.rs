//! Shared helpers for the integration tests.

// Each test binary uses a different subset.
#![allow(dead_code)]
#![allow(unused_imports)]

mod agent;
mod fixtures;
mod stream;

pub use agent::{AgentNet, SimAgent};
pub use fixtures::*;
pub use stream::collect_stream;
