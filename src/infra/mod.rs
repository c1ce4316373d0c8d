//! Infrastructure layer: config, logging, storage paths and the client identity file.

pub mod config;
pub mod contracts;
pub mod error;
pub mod identity;
pub mod logging;
pub mod secrets;
pub mod storage_layout;
pub mod stubs;
