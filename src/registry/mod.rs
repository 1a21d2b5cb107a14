use std::{collections::BTreeMap, fmt};

use futures::future;
use thiserror::Error;
use tokio::task::{self, JoinError};
use tracing::{instrument, Instrument};

use crate::spec::{self, CompletionSpec, DefinitionError};

mod bundled;
mod source;

pub use bundled::Bundled;
pub use source::{Definition, DefinitionSource, Directory, SourceError};

#[cfg(test)]
pub use source::MockDefinitionSource;

/// One loaded version of a command's spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    version: Option<String>,
    origin: String,
    spec: CompletionSpec,
}

impl Entry {
    pub fn new(spec: CompletionSpec, version: Option<String>, origin: String) -> Self {
        Self {
            version,
            origin,
            spec,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.spec.name()
    }

    #[inline]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    #[inline]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    #[inline]
    pub fn spec(&self) -> &CompletionSpec {
        &self.spec
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())?;
        if let Some(version) = &self.version {
            write!(f, "@{version}")?;
        }
        write!(f, " ({})", self.origin)
    }
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Definition(#[from] DefinitionError),
    #[error("Loading task did not finish")]
    Task(#[from] JoinError),
}

/// A definition that was left out of the registry.
#[derive(Debug)]
pub struct LoadFailure {
    pub origin: String,
    pub error: LoadError,
}

/// Completion specs keyed by command name.
///
/// A name may carry several versions. [`Registry::get`] answers with the
/// pinned version if there is one, otherwise with the entry inserted last.
#[derive(Debug, Default)]
pub struct Registry {
    entries: BTreeMap<String, Vec<Entry>>,
    pins: BTreeMap<String, String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pins(pins: BTreeMap<String, String>) -> Self {
        Self {
            entries: BTreeMap::new(),
            pins,
        }
    }

    /// Adds an entry, superseding an earlier one with the same name and
    /// version.
    #[instrument(skip_all, fields(entry = %entry))]
    pub fn insert(&mut self, entry: Entry) {
        let versions = self.entries.entry(entry.name().to_string()).or_default();

        if let Some(pos) = versions.iter().position(|e| e.version == entry.version) {
            let old = versions.remove(pos);
            tracing::warn!(superseded = %old, "definition registered twice");
        }

        versions.push(entry);
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        let versions = self.entries.get(name)?;

        if let Some(pin) = self.pins.get(name) {
            if let Some(entry) = versions.iter().find(|e| e.version() == Some(pin.as_str())) {
                return Some(entry);
            }
            tracing::warn!(%name, %pin, "pinned version is not registered, using latest");
        }

        versions.last()
    }

    pub fn get_version(&self, name: &str, version: &str) -> Option<&Entry> {
        self.entries
            .get(name)?
            .iter()
            .find(|e| e.version() == Some(version))
    }

    /// All versions registered for `name`, in insertion order.
    pub fn versions(&self, name: &str) -> &[Entry] {
        self.entries.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values().flatten()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reads and loads every definition the sources offer.
    ///
    /// Sources are processed in parallel on the blocking pool. Entries are
    /// inserted in source order, so a later source supersedes an earlier one.
    /// Definitions that fail to read, parse or validate are returned as
    /// [`LoadFailure`]s and kept out of the registry; they never affect the
    /// other definitions.
    #[instrument(skip_all, fields(sources = sources.len()))]
    pub async fn load(
        sources: Vec<Box<dyn DefinitionSource>>,
        pins: BTreeMap<String, String>,
    ) -> (Registry, Vec<LoadFailure>) {
        let labels: Vec<String> = sources.iter().map(|source| source.label()).collect();

        let tasks = sources.into_iter().map(|source| {
            task::spawn_blocking(move || load_source(source.as_ref()))
                .instrument(tracing::trace_span!("loading source"))
        });
        let results = future::join_all(tasks).await;

        let mut registry = Registry::with_pins(pins);
        let mut failures = Vec::new();

        for (label, result) in labels.into_iter().zip(results) {
            let outcomes = match result {
                Ok(outcomes) => outcomes,
                Err(err) => {
                    failures.push(LoadFailure {
                        origin: label,
                        error: err.into(),
                    });
                    continue;
                }
            };

            for outcome in outcomes {
                match outcome {
                    Ok(entry) => registry.insert(entry),
                    Err(failure) => failures.push(failure),
                }
            }
        }

        for failure in &failures {
            tracing::warn!(origin = %failure.origin, error = %failure.error, "skipping definition");
        }
        tracing::info!(
            names = registry.entries.len(),
            failures = failures.len(),
            "registry loaded"
        );

        (registry, failures)
    }
}

fn load_source(source: &dyn DefinitionSource) -> Vec<Result<Entry, LoadFailure>> {
    source
        .definitions()
        .into_iter()
        .map(|definition| {
            let definition = definition.map_err(|err| LoadFailure {
                origin: source.label(),
                error: err.into(),
            })?;

            match spec::parse(&definition.text, definition.format) {
                Ok(spec) => Ok(Entry::new(spec, definition.version, definition.origin)),
                Err(err) => Err(LoadFailure {
                    origin: definition.origin,
                    error: err.into(),
                }),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::spec::{parse_json, Format};

    fn entry(json: &str, version: Option<&str>, origin: &str) -> Entry {
        Entry::new(
            parse_json(json).unwrap(),
            version.map(ToString::to_string),
            origin.to_string(),
        )
    }

    fn definition(
        origin: &str,
        version: Option<&str>,
        text: &str,
    ) -> Result<Definition, SourceError> {
        Ok(Definition {
            origin: origin.to_string(),
            version: version.map(ToString::to_string),
            format: Format::Json,
            text: text.to_string(),
        })
    }

    fn mock_source(
        label: &'static str,
        definitions: Vec<Result<Definition, SourceError>>,
    ) -> Box<dyn DefinitionSource> {
        let mut mock = MockDefinitionSource::new();
        mock.expect_label().return_const(label.to_string());
        mock.expect_definitions().return_once(move || definitions);
        Box::new(mock)
    }

    #[test]
    fn latest_insert_wins_without_pin() {
        let mut registry = Registry::new();
        registry.insert(entry(r#"{"name":"w"}"#, Some("1"), "a"));
        registry.insert(entry(r#"{"name":"w"}"#, Some("2"), "b"));

        assert_eq!(Some("2"), registry.get("w").unwrap().version());
        assert_eq!(Some("a"), registry.get_version("w", "1").map(Entry::origin));
        assert_eq!(2, registry.versions("w").len());
        assert!(registry.get("other").is_none());
        assert!(registry.versions("other").is_empty());
    }

    #[test]
    fn pin_selects_an_older_version() {
        let pins = BTreeMap::from([("w".to_string(), "1".to_string())]);
        let mut registry = Registry::with_pins(pins);
        registry.insert(entry(r#"{"name":"w"}"#, Some("1"), "a"));
        registry.insert(entry(r#"{"name":"w"}"#, Some("2"), "b"));

        assert_eq!(Some("1"), registry.get("w").unwrap().version());
    }

    #[test]
    fn unknown_pin_falls_back_to_latest() {
        let pins = BTreeMap::from([("w".to_string(), "9".to_string())]);
        let mut registry = Registry::with_pins(pins);
        registry.insert(entry(r#"{"name":"w"}"#, Some("1"), "a"));

        assert_eq!(Some("1"), registry.get("w").unwrap().version());
    }

    #[test]
    fn same_version_supersedes() {
        let mut registry = Registry::new();
        registry.insert(entry(r#"{"name":"w"}"#, None, "a"));
        registry.insert(entry(r#"{"name":"w","description":"newer"}"#, None, "b"));

        assert_eq!(1, registry.versions("w").len());
        assert_eq!("b", registry.get("w").unwrap().origin());
        assert_eq!("newer", registry.get("w").unwrap().spec().description());
    }

    #[test]
    fn entries_display_with_version() {
        assert_eq!(
            "w@1.0 (here)",
            entry(r#"{"name":"w"}"#, Some("1.0"), "here").to_string()
        );
        assert_eq!("w (here)", entry(r#"{"name":"w"}"#, None, "here").to_string());
    }

    #[tokio::test]
    async fn broken_definitions_do_not_affect_others() {
        let source = mock_source(
            "mock",
            vec![
                definition("good", None, r#"{"name":"good"}"#),
                definition(
                    "dup",
                    None,
                    r#"{"name":"dup","subcommands":[{"name":"a"},{"name":"a"}]}"#,
                ),
                definition("garbage", None, "{"),
                Err(SourceError::ReadFileError(
                    "unreadable.json".into(),
                    std::io::Error::from(std::io::ErrorKind::PermissionDenied),
                )),
            ],
        );

        let (registry, failures) = Registry::load(vec![source], BTreeMap::new()).await;

        assert_eq!(vec!["good"], registry.names().collect::<Vec<_>>());

        let origins: Vec<&str> = failures.iter().map(|f| f.origin.as_str()).collect();
        assert_eq!(vec!["dup", "garbage", "mock"], origins);
        assert!(matches!(
            failures[0].error,
            LoadError::Definition(DefinitionError::Schema(_))
        ));
        assert!(matches!(
            failures[1].error,
            LoadError::Definition(DefinitionError::Json(_))
        ));
        assert!(matches!(failures[2].error, LoadError::Source(_)));
    }

    #[tokio::test]
    async fn later_sources_supersede_earlier_ones() {
        let first = mock_source(
            "first",
            vec![definition("first", None, r#"{"name":"w","description":"first"}"#)],
        );
        let second = mock_source(
            "second",
            vec![definition("second", None, r#"{"name":"w","description":"second"}"#)],
        );

        let (registry, failures) = Registry::load(vec![first, second], BTreeMap::new()).await;

        assert!(failures.is_empty());
        assert_eq!("second", registry.get("w").unwrap().spec().description());
    }

    #[tokio::test]
    async fn bundled_and_directory_sources_combine() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("cargo-watch@9.0.0.json"),
            r#"{"name":"cargo-watch","subcommands":[{"name":"watch"}]}"#,
        )
        .unwrap();
        fs::write(dir.path().join("broken.yaml"), "options: []").unwrap();

        let sources: Vec<Box<dyn DefinitionSource>> =
            vec![Box::new(Bundled), Box::new(Directory::new(dir.path()))];
        let (registry, failures) = Registry::load(sources, BTreeMap::new()).await;

        let versions: Vec<Option<&str>> = registry
            .versions("cargo-watch")
            .iter()
            .map(Entry::version)
            .collect();
        assert_eq!(vec![Some("7.8.0"), Some("8.4.0"), Some("9.0.0")], versions);
        assert_eq!(Some("9.0.0"), registry.get("cargo-watch").unwrap().version());

        assert_eq!(1, failures.len());
        assert!(failures[0].origin.ends_with("broken.yaml"));
    }
}
