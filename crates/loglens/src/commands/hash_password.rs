//! Hash-password command implementation

use anyhow::{bail, Result};

pub fn execute(password: &str) -> Result<()> {
    if password.is_empty() {
        bail!("Password must not be empty");
    }
    println!("{}", loglens_web::hash_password(password));
    Ok(())
}
