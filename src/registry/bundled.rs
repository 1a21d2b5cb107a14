use super::source::{Definition, DefinitionSource, SourceError};
use crate::spec::Format;

const BUNDLED: &[(&str, &str, Format, &str)] = &[
    (
        "cargo-watch@7.8.0.json",
        "7.8.0",
        Format::Json,
        include_str!("../../specs/cargo-watch@7.8.0.json"),
    ),
    (
        "cargo-watch@8.4.0.yaml",
        "8.4.0",
        Format::Yaml,
        include_str!("../../specs/cargo-watch@8.4.0.yaml"),
    ),
];

/// The definitions compiled into the binary, oldest version first.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bundled;

impl DefinitionSource for Bundled {
    fn label(&self) -> String {
        "bundled".to_string()
    }

    fn definitions(&self) -> Vec<Result<Definition, SourceError>> {
        BUNDLED
            .iter()
            .map(|(file, version, format, text)| {
                Ok(Definition {
                    origin: format!("bundled:{file}"),
                    version: Some(version.to_string()),
                    format: *format,
                    text: text.to_string(),
                })
            })
            .collect()
    }
}
