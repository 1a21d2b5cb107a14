use clap::{Arg, ArgAction, Command};

use super::{
    load,
    raw::{RawArgument, RawName, RawOption, RawSpec},
    CompletionSpec, SchemaViolation,
};

/// Derives a completion spec from a `clap` command tree.
///
/// The command is built first, so the generated `--help`/`--version` flags
/// and the `help` subcommand are part of the result.
///
/// # Errors
///
/// Returns a `SchemaViolation` if the command tree declares the same flag
/// twice in one scope.
pub fn from_command(cmd: &Command) -> Result<CompletionSpec, SchemaViolation> {
    let mut cmd = cmd.clone();
    cmd.build();

    load(raw_command(&cmd))
}

fn raw_command(cmd: &Command) -> RawSpec {
    RawSpec {
        name: Some(cmd.get_name().to_string()),
        description: cmd.get_about().map(ToString::to_string),
        subcommands: cmd.get_subcommands().map(raw_command).collect(),
        options: cmd
            .get_arguments()
            .filter(|arg| !arg.is_positional())
            .map(raw_option)
            .collect(),
        args: cmd.get_positionals().last().map(raw_positional),
    }
}

fn raw_option(arg: &Arg) -> RawOption {
    let mut aliases: Vec<String> = Vec::new();
    if let Some(shorts) = arg.get_short_and_visible_aliases() {
        aliases.extend(shorts.into_iter().map(|c| format!("-{c}")));
    }
    if let Some(longs) = arg.get_long_and_visible_aliases() {
        aliases.extend(longs.into_iter().map(|l| format!("--{l}")));
    }

    let name = if aliases.len() == 1 {
        aliases.pop().map(RawName::One)
    } else {
        Some(RawName::Many(aliases))
    };

    let args = arg.get_action().takes_values().then(|| RawArgument {
        name: Some(value_name(arg)),
        is_optional: !arg.is_required_set(),
        is_variadic: is_unbounded(arg),
    });

    RawOption {
        name,
        description: arg.get_help().map(ToString::to_string),
        is_repeatable: matches!(arg.get_action(), ArgAction::Append | ArgAction::Count),
        hidden: arg.is_hide_set(),
        args,
    }
}

fn raw_positional(arg: &Arg) -> RawArgument {
    RawArgument {
        name: Some(value_name(arg)),
        is_optional: !arg.is_required_set(),
        is_variadic: is_unbounded(arg),
    }
}

fn is_unbounded(arg: &Arg) -> bool {
    arg.get_num_args()
        .is_some_and(|range| range.max_values() == usize::MAX)
}

// Labels follow the argument id, `cmd:trail` is shown as `cmd-trail`.
fn value_name(arg: &Arg) -> String {
    arg.get_id().as_str().replace(':', "-")
}
