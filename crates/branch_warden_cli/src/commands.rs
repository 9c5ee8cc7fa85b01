//! Command modules for the BranchWarden CLI.
//!
//! This module contains all the command implementations for the CLI
//! application. Each submodule handles a specific command:
//!
//! - `init_cmd`: Starter configuration file generation
//! - `sync_cmd`: Pushing the configured branch restrictions to Bitbucket Cloud

pub mod init_cmd;
pub mod sync_cmd;
