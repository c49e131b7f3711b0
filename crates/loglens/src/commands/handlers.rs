//! Handlers command implementation

use anyhow::Result;
use std::path::Path;

use crate::output::print_handler_table;

pub fn execute(config_path: Option<&Path>, json: bool) -> Result<()> {
    let (config, _) = super::load_config(config_path)?;
    let registry = super::build_registry(&config);

    print_handler_table(&super::file_backed_descriptors(&registry), json);
    Ok(())
}
