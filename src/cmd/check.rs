use std::io::{self, Write};

use eyre::{bail, Result};
use tracing::instrument;

use crate::registry::{LoadFailure, Registry};

/// Prints one line per loaded entry and per failure.
///
/// # Errors
///
/// Returns an `Err` if any definition failed to load, or stdout can not be
/// written to.
#[instrument(skip_all)]
pub fn run(registry: &Registry, failures: &[LoadFailure]) -> Result<()> {
    if registry.is_empty() {
        tracing::warn!("no definitions registered, is `bundled` disabled?");
    }

    let mut out = io::stdout().lock();
    report(&mut out, registry, failures)?;

    if !failures.is_empty() {
        bail!("{} definition(s) failed to load", failures.len());
    }

    Ok(())
}

fn report<W: Write>(out: &mut W, registry: &Registry, failures: &[LoadFailure]) -> io::Result<()> {
    for entry in registry.entries() {
        writeln!(out, "ok   {entry}")?;
    }
    for failure in failures {
        writeln!(out, "FAIL {}: {}", failure.origin, failure.error)?;
    }
    Ok(())
}
