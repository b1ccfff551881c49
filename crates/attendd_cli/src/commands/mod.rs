//! CLI command implementations.

pub mod dump_logs;
pub mod init;
pub mod inspect;
pub mod serve;
