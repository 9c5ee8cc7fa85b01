//! Implementation of the `init` command.

use clap::Args;

use crate::config::{self, AppConfig};
use crate::errors::Error;

#[cfg(test)]
#[path = "init_cmd_tests.rs"]
mod tests;

/// Arguments for the `init` command.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path to write the configuration file to
    #[arg(long)]
    pub config: Option<String>,

    /// Overwrite an existing configuration file
    #[arg(long)]
    pub force: bool,
}

/// Writes a starter configuration file with placeholder values.
///
/// Refuses to overwrite an existing file unless `--force` is given.
pub fn execute(args: &InitArgs) -> Result<(), Error> {
    let path = config::get_config_path(args.config.as_deref());

    if path.exists() && !args.force {
        return Err(Error::Config(format!(
            "{} already exists; pass --force to overwrite",
            path.display()
        )));
    }

    AppConfig::default().save(&path)?;
    println!("Wrote starter configuration to {}", path.display());
    Ok(())
}
