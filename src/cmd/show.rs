use std::io::{self, Write};

use eyre::{ContextCompat, Result, WrapErr};
use tracing::instrument;

use crate::{
    interface::{OutputFormat, ShowArgs},
    registry::Registry,
    spec::CompletionSpec,
};

#[instrument(skip(registry))]
pub fn run(registry: &Registry, args: &ShowArgs) -> Result<()> {
    let entry = match &args.release {
        Some(version) => registry.get_version(&args.command, version),
        None => registry.get(&args.command),
    }
    .wrap_err_with(|| match &args.release {
        Some(version) => format!("`{}` has no registered version `{version}`", args.command),
        None => format!("no completion spec registered for `{}`", args.command),
    })?;

    tracing::info!(%entry, "showing spec");

    let text = render(entry.spec(), args.output)?;
    let mut out = io::stdout().lock();
    out.write_all(text.as_bytes())
        .wrap_err("writing the spec to stdout")
}

fn render(spec: &CompletionSpec, output: OutputFormat) -> Result<String> {
    Ok(match output {
        OutputFormat::Json => serde_json::to_string_pretty(spec)? + "\n",
        OutputFormat::Yaml => serde_yaml::to_string(spec)?,
    })
}
