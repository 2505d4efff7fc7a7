//! Command implementation modules

pub mod cleanup;
pub mod init_log;
pub mod report;
pub mod run;
