use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use thiserror::Error;
use tracing::instrument;

use super::{
    raw::{RawArgument, RawName, RawOption, RawSpec},
    ArgumentSpec, CompletionSpec, OptionName, OptionSpec,
};

/// Location of a field inside a definition, e.g.
/// `cargo-watch.subcommands[0].options[3].name[1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath(String);

impl FieldPath {
    fn root(name: Option<&str>) -> Self {
        match name {
            Some(name) if !name.is_empty() => Self(name.to_string()),
            _ => Self("$".to_string()),
        }
    }

    fn field(&self, field: &str) -> Self {
        Self(format!("{}.{field}", self.0))
    }

    fn index(&self, field: &str, index: usize) -> Self {
        Self(format!("{}.{field}[{index}]", self.0))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("missing required field `name`")]
    MissingName,
    #[error("`name` must not be empty")]
    EmptyName,
    #[error("an option needs at least one alias")]
    NoAliases,
    #[error("subcommand `{0}` is declared more than once")]
    DuplicateSubcommand(String),
    #[error("alias `{0}` is listed twice")]
    DuplicateAlias(String),
    #[error("alias `{alias}` is already used by `{owner}`")]
    AliasTaken { alias: String, owner: FieldPath },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("schema violation at `{path}`: {reason}")]
pub struct SchemaViolation {
    pub path: FieldPath,
    pub reason: Violation,
}

impl SchemaViolation {
    fn new(path: FieldPath, reason: Violation) -> Self {
        Self { path, reason }
    }
}

/// Validates a raw definition and turns it into an immutable
/// [`CompletionSpec`] tree.
///
/// # Errors
///
/// Returns the first `SchemaViolation` found, in declaration order.
#[instrument(skip_all, fields(name = ?definition.name))]
pub fn load(definition: RawSpec) -> Result<CompletionSpec, SchemaViolation> {
    let path = FieldPath::root(definition.name.as_deref());
    let spec = load_command(definition, &path)?;

    tracing::debug!(
        subcommands = spec.subcommands.len(),
        options = spec.options.len(),
        "loaded definition"
    );

    Ok(spec)
}

fn load_command(raw: RawSpec, path: &FieldPath) -> Result<CompletionSpec, SchemaViolation> {
    let name = required_name(raw.name, path)?;

    let mut siblings = HashSet::new();
    let mut subcommands = Vec::with_capacity(raw.subcommands.len());
    for (i, sub) in raw.subcommands.into_iter().enumerate() {
        let sub_path = path.index("subcommands", i);
        let sub = load_command(sub, &sub_path)?;
        if !siblings.insert(sub.name.clone()) {
            return Err(SchemaViolation::new(
                sub_path.field("name"),
                Violation::DuplicateSubcommand(sub.name),
            ));
        }
        subcommands.push(sub);
    }

    let mut owners: HashMap<String, FieldPath> = HashMap::new();
    let mut options = Vec::with_capacity(raw.options.len());
    for (i, option) in raw.options.into_iter().enumerate() {
        let option_path = path.index("options", i);
        let option = load_option(option, &option_path)?;
        for (j, alias) in option.aliases().iter().enumerate() {
            if let Some(owner) = owners.get(alias) {
                return Err(SchemaViolation::new(
                    alias_path(&option, &option_path, j),
                    Violation::AliasTaken {
                        alias: alias.clone(),
                        owner: owner.clone(),
                    },
                ));
            }
        }
        for alias in option.aliases() {
            owners.insert(alias.clone(), option_path.clone());
        }
        options.push(option);
    }

    let args = raw
        .args
        .map(|args| load_argument(args, &path.field("args")))
        .transpose()?;

    Ok(CompletionSpec {
        name,
        description: raw.description.unwrap_or_default(),
        subcommands,
        options,
        args,
    })
}

fn load_option(raw: RawOption, path: &FieldPath) -> Result<OptionSpec, SchemaViolation> {
    let name = match raw.name {
        None => {
            return Err(SchemaViolation::new(
                path.field("name"),
                Violation::MissingName,
            ))
        }
        Some(RawName::One(name)) => OptionName::Single(non_empty(name, &path.field("name"))?),
        Some(RawName::Many(names)) => {
            if names.is_empty() {
                return Err(SchemaViolation::new(path.field("name"), Violation::NoAliases));
            }

            let mut seen = HashSet::new();
            for (i, alias) in names.iter().enumerate() {
                let alias_path = path.index("name", i);
                if alias.is_empty() {
                    return Err(SchemaViolation::new(alias_path, Violation::EmptyName));
                }
                if !seen.insert(alias.as_str()) {
                    return Err(SchemaViolation::new(
                        alias_path,
                        Violation::DuplicateAlias(alias.clone()),
                    ));
                }
            }

            OptionName::Aliases(names)
        }
    };

    let args = raw
        .args
        .map(|args| load_argument(args, &path.field("args")))
        .transpose()?;

    Ok(OptionSpec {
        name,
        description: raw.description.unwrap_or_default(),
        is_repeatable: raw.is_repeatable,
        hidden: raw.hidden,
        args,
    })
}

fn load_argument(raw: RawArgument, path: &FieldPath) -> Result<ArgumentSpec, SchemaViolation> {
    Ok(ArgumentSpec {
        name: required_name(raw.name, path)?,
        is_optional: raw.is_optional,
        is_variadic: raw.is_variadic,
    })
}

fn required_name(name: Option<String>, path: &FieldPath) -> Result<String, SchemaViolation> {
    let path = path.field("name");
    match name {
        Some(name) => non_empty(name, &path),
        None => Err(SchemaViolation::new(path, Violation::MissingName)),
    }
}

fn non_empty(name: String, path: &FieldPath) -> Result<String, SchemaViolation> {
    if name.is_empty() {
        return Err(SchemaViolation::new(path.clone(), Violation::EmptyName));
    }
    Ok(name)
}

fn alias_path(option: &OptionSpec, path: &FieldPath, index: usize) -> FieldPath {
    match option.name {
        OptionName::Single(_) => path.field("name"),
        OptionName::Aliases(_) => path.index("name", index),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::spec::{parse_json, DefinitionError};

    fn violation(json: &str) -> SchemaViolation {
        match parse_json(json) {
            Err(DefinitionError::Schema(violation)) => violation,
            other => panic!("expected a schema violation, got {other:?}"),
        }
    }

    macro_rules! rejects {
        ($($name:ident: $json:expr => $path:expr, $reason:expr,)*) => {
            $(
                #[test]
                fn $name() {
                    let violation = violation($json);

                    assert_eq!($path, violation.path.as_str());
                    assert_eq!($reason, violation.reason);
                }
            )*
        };
    }

    rejects! {
        root_without_name: r#"{ "description": "nameless" }"#
            => "$.name", Violation::MissingName,
        root_with_empty_name: r#"{ "name": "" }"#
            => "$.name", Violation::EmptyName,
        subcommand_without_name: r#"{ "name": "a", "subcommands": [{ "name": "b" }, {}] }"#
            => "a.subcommands[1].name", Violation::MissingName,
        duplicate_siblings: r#"{ "name": "a", "subcommands": [{ "name": "b" }, { "name": "b" }] }"#
            => "a.subcommands[1].name", Violation::DuplicateSubcommand("b".into()),
        option_without_name: r#"{ "name": "a", "options": [{ "description": "?" }] }"#
            => "a.options[0].name", Violation::MissingName,
        option_with_empty_alias_list: r#"{ "name": "a", "options": [{ "name": [] }] }"#
            => "a.options[0].name", Violation::NoAliases,
        option_with_empty_alias: r#"{ "name": "a", "options": [{ "name": ["-a", ""] }] }"#
            => "a.options[0].name[1]", Violation::EmptyName,
        alias_repeated_in_option: r#"{ "name": "a", "options": [{ "name": ["-x", "--exec", "-x"] }] }"#
            => "a.options[0].name[2]", Violation::DuplicateAlias("-x".into()),
        option_argument_without_name: r#"{ "name": "a", "options": [{ "name": "-d", "args": { "isOptional": true } }] }"#
            => "a.options[0].args.name", Violation::MissingName,
        command_argument_without_name: r#"{ "name": "a", "args": {} }"#
            => "a.args.name", Violation::MissingName,
    }

    #[test]
    fn alias_shared_between_options_names_the_first_owner() {
        let violation = violation(
            r#"{ "name": "a", "options": [
                { "name": ["-x", "--exec"] },
                { "name": "--quiet" },
                { "name": ["-q", "-x"] }
            ] }"#,
        );

        assert_eq!("a.options[2].name[1]", violation.path.as_str());
        assert_eq!(
            Violation::AliasTaken {
                alias: "-x".into(),
                owner: FieldPath("a.options[0]".into()),
            },
            violation.reason
        );
    }

    #[test]
    fn same_alias_in_different_scopes_is_fine() {
        let spec = parse_json(
            r#"{ "name": "a",
                 "options": [{ "name": ["-h", "--help"] }],
                 "subcommands": [{ "name": "b", "options": [{ "name": ["-h", "--help"] }] }] }"#,
        )
        .unwrap();

        assert_eq!("a", spec.name());
    }

    #[test]
    fn same_name_in_different_branches_is_fine() {
        let spec = parse_json(
            r#"{ "name": "a", "subcommands": [
                { "name": "b", "subcommands": [{ "name": "help" }] },
                { "name": "help" }
            ] }"#,
        )
        .unwrap();

        assert_eq!(2, spec.subcommands().len());
    }

    #[test]
    fn violation_message_carries_the_path() {
        let violation = violation(r#"{ "name": "a", "subcommands": [{ "name": "" }] }"#);

        assert_eq!(
            "schema violation at `a.subcommands[0].name`: `name` must not be empty",
            violation.to_string()
        );
    }

    #[test]
    fn loaded_name_matches_definition() {
        for name in ["cargo-watch", "x", "with space"] {
            let raw = RawSpec {
                name: Some(name.to_string()),
                ..RawSpec::default()
            };

            assert_eq!(name, load(raw).unwrap().name());
        }
    }
}
