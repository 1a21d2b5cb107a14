use serde::{Deserialize, Serialize};

// Required fields are `Option`s here so that a missing `name` surfaces as a
// `SchemaViolation` with a field path instead of a deserializer message.

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawSpec {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub subcommands: Vec<RawSpec>,
    #[serde(default)]
    pub options: Vec<RawOption>,
    pub args: Option<RawArgument>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawOption {
    pub name: Option<RawName>,
    pub description: Option<String>,
    #[serde(default)]
    pub is_repeatable: bool,
    #[serde(default)]
    pub hidden: bool,
    pub args: Option<RawArgument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawName {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawArgument {
    pub name: Option<String>,
    #[serde(default)]
    pub is_optional: bool,
    #[serde(default)]
    pub is_variadic: bool,
}
