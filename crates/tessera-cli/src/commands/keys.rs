use anyhow::{Context, Result};
use colored::Colorize;
use tessera_auth::token::{SigningAlgorithm, generate_secret};

use crate::output::print_success;

pub fn keygen(bytes: usize) -> Result<()> {
    let algorithm = SigningAlgorithm::for_key_length(bytes)?;
    let secret = generate_secret(bytes).context("Failed to generate secret")?;

    println!("{secret}");
    print_success(&format!(
        "Generated {}-bit secret (signs with {})",
        bytes * 8,
        algorithm.to_string().cyan()
    ));
    Ok(())
}
