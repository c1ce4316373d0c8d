//! Backend gateway: HTTP and in-memory adapters, request dispatch and poll timers.

pub mod dispatcher;
pub mod http;
pub mod memory;
pub mod poller;
pub mod wire;
