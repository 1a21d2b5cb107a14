use std::{fmt, path::Path};

use serde::Serialize;
use thiserror::Error;

mod command;
mod load;
mod raw;
mod resolve;

pub use command::from_command;
pub use load::{load, FieldPath, SchemaViolation, Violation};
pub use raw::{RawArgument, RawName, RawOption, RawSpec};
pub use resolve::Visibility;

/// The completable surface of one command: its subcommands, options and
/// trailing positional argument.
///
/// Values of this type only ever come out of [`load`], so every instance
/// has a non-empty name, unique sibling subcommands and unique aliases per
/// scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionSpec {
    pub(crate) name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub(crate) description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) subcommands: Vec<CompletionSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) options: Vec<OptionSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) args: Option<ArgumentSpec>,
}

/// One flag, possibly known under several aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionSpec {
    pub(crate) name: OptionName,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub(crate) description: String,
    #[serde(skip_serializing_if = "is_false")]
    pub(crate) is_repeatable: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub(crate) hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) args: Option<ArgumentSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OptionName {
    Single(String),
    Aliases(Vec<String>),
}

/// The value slot of an option or the trailing positional slot of a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentSpec {
    pub(crate) name: String,
    #[serde(skip_serializing_if = "is_false")]
    pub(crate) is_optional: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub(crate) is_variadic: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl CompletionSpec {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[inline]
    pub fn subcommands(&self) -> &[CompletionSpec] {
        &self.subcommands
    }

    #[inline]
    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    #[inline]
    pub fn args(&self) -> Option<&ArgumentSpec> {
        self.args.as_ref()
    }
}

impl OptionName {
    /// All spellings of the option, in declaration order.
    pub fn aliases(&self) -> &[String] {
        match self {
            OptionName::Single(name) => std::slice::from_ref(name),
            OptionName::Aliases(names) => names,
        }
    }
}

impl OptionSpec {
    #[inline]
    pub fn name(&self) -> &OptionName {
        &self.name
    }

    #[inline]
    pub fn aliases(&self) -> &[String] {
        self.name.aliases()
    }

    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether the host may suggest this option again after it already
    /// appeared on the current command line.
    #[inline]
    pub fn is_repeatable(&self) -> bool {
        self.is_repeatable
    }

    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    #[inline]
    pub fn args(&self) -> Option<&ArgumentSpec> {
        self.args.as_ref()
    }

    #[inline]
    pub fn takes_argument(&self) -> bool {
        self.args.is_some()
    }

    pub(crate) fn matches_prefix(&self, prefix: &str) -> bool {
        self.aliases().iter().any(|alias| alias.starts_with(prefix))
    }
}

impl ArgumentSpec {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn is_optional(&self) -> bool {
        self.is_optional
    }

    #[inline]
    pub fn is_variadic(&self) -> bool {
        self.is_variadic
    }
}

impl fmt::Display for ArgumentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_optional {
            write!(f, "[{}]", self.name)?;
        } else {
            write!(f, "<{}>", self.name)?;
        }
        if self.is_variadic {
            f.write_str("...")?;
        }
        Ok(())
    }
}

impl fmt::Display for OptionSpec {
    /// Renders as `-x, --exec [cmd-cargo]...`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.aliases().join(", "))?;
        if let Some(args) = &self.args {
            write!(f, " {args}")?;
        }
        Ok(())
    }
}

/// Serialization formats a definition can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Guesses the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Format> {
        match path.extension()?.to_str()? {
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum DefinitionError {
    #[error("Can not parse JSON definition: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Can not parse YAML definition: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Schema(#[from] SchemaViolation),
}

/// Deserializes a definition and validates it with [`load`].
///
/// # Errors
///
/// Returns a `DefinitionError::Json`/`DefinitionError::Yaml` if the text is
/// not a well-formed definition, and `DefinitionError::Schema` if it
/// violates the schema.
pub fn parse(text: &str, format: Format) -> Result<CompletionSpec, DefinitionError> {
    let raw: RawSpec = match format {
        Format::Json => serde_json::from_str(text)?,
        Format::Yaml => serde_yaml::from_str(text)?,
    };

    Ok(load(raw)?)
}

pub fn parse_json(text: &str) -> Result<CompletionSpec, DefinitionError> {
    parse(text, Format::Json)
}

pub fn parse_yaml(text: &str) -> Result<CompletionSpec, DefinitionError> {
    parse(text, Format::Yaml)
}
