use std::io::{self, Write};

use eyre::{ContextCompat, Result};
use tracing::instrument;

use crate::{
    interface::{OptionsArgs, SubcommandArgs},
    registry::{Entry, Registry},
    spec::{CompletionSpec, Visibility},
};

fn lookup<'a>(registry: &'a Registry, command: &str) -> Result<&'a Entry> {
    registry
        .get(command)
        .wrap_err_with(|| format!("no completion spec registered for `{command}`"))
}

/// Prints the options matching `--prefix` in the scope the tokens lead to.
#[instrument(skip(registry))]
pub fn options(registry: &Registry, args: &OptionsArgs, visibility: Visibility) -> Result<()> {
    let entry = lookup(registry, &args.command)?;
    let visibility = if args.hidden {
        Visibility::IncludeHidden
    } else {
        visibility
    };

    let node = entry.spec().descend(&args.tokens);
    tracing::debug!(scope = node.name(), "resolving options");

    let mut out = io::stdout().lock();
    Ok(write_options(&mut out, node, &args.prefix, visibility)?)
}

/// Prints the named subcommand. A missing subcommand is reported, not an
/// error.
#[instrument(skip(registry))]
pub fn subcommand(registry: &Registry, args: &SubcommandArgs) -> Result<()> {
    let entry = lookup(registry, &args.command)?;

    let mut out = io::stdout().lock();
    Ok(write_subcommand(&mut out, entry.spec(), &args.token)?)
}

fn write_options<W: Write>(
    out: &mut W,
    node: &CompletionSpec,
    prefix: &str,
    visibility: Visibility,
) -> io::Result<()> {
    for option in node.resolve_options(prefix, visibility) {
        let mut line = format!("{:<36} {}", option.to_string(), option.description());
        if option.is_repeatable() {
            line.push_str(" (repeatable)");
        }
        if option.is_hidden() {
            line.push_str(" (hidden)");
        }
        writeln!(out, "{}", line.trim_end())?;
    }
    Ok(())
}

fn write_subcommand<W: Write>(out: &mut W, spec: &CompletionSpec, token: &str) -> io::Result<()> {
    match spec.resolve_subcommand(token) {
        Some(sub) => writeln!(out, "{:<36} {}", sub.name(), sub.description()),
        None => writeln!(out, "`{}` has no subcommand `{token}`", spec.name()),
    }
}
