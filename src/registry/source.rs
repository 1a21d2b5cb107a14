use std::{
    fs,
    io::Error as IoError,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::instrument;

use crate::spec::Format;

/// The unparsed text of one definition and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub origin: String,
    pub version: Option<String>,
    pub format: Format,
    pub text: String,
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Can not list definitions in `{}`", .0.display())]
    ReadDirError(PathBuf, #[source] IoError),
    #[error("Can not read definition `{}`", .0.display())]
    ReadFileError(PathBuf, #[source] IoError),
}

/// Somewhere definitions can be read from.
///
/// Each item of the returned list stands alone, an unreadable file does not
/// hide the readable ones next to it.
#[cfg_attr(test, mockall::automock)]
pub trait DefinitionSource: Send + Sync {
    fn label(&self) -> String;

    fn definitions(&self) -> Vec<Result<Definition, SourceError>>;
}

/// Every `*.json`, `*.yaml` and `*.yml` file directly inside a directory.
///
/// A file named `name@version.ext` registers that version of `name`.
#[derive(Debug, Clone)]
pub struct Directory {
    path: PathBuf,
}

impl Directory {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl DefinitionSource for Directory {
    fn label(&self) -> String {
        self.path.display().to_string()
    }

    #[instrument(skip(self), fields(dir = %self.path.display()))]
    fn definitions(&self) -> Vec<Result<Definition, SourceError>> {
        let entries = match fs::read_dir(&self.path) {
            Ok(entries) => entries,
            Err(err) => return vec![Err(SourceError::ReadDirError(self.path.clone(), err))],
        };

        let mut files: Vec<(PathBuf, Format)> = entries
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.is_file())
            .filter_map(|path| Format::from_path(&path).map(|format| (path, format)))
            .collect();
        files.sort_by(|(a, _), (b, _)| a.cmp(b));

        tracing::debug!(count = files.len(), "found definition files");

        files
            .into_iter()
            .map(|(path, format)| {
                let text = fs::read_to_string(&path)
                    .map_err(|err| SourceError::ReadFileError(path.clone(), err))?;
                Ok(Definition {
                    origin: path.display().to_string(),
                    version: version_from_stem(&path),
                    format,
                    text,
                })
            })
            .collect()
    }
}

fn version_from_stem(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let (_, version) = stem.split_once('@')?;
    (!version.is_empty()).then(|| version.to_string())
}
