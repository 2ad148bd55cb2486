//! Building program objects from source files.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::api::ProgramApi;
use crate::error::{CluError, Result};
use crate::query::try_with_capacity;
use crate::types::{ContextId, ProgramId};

const CREATE_PROGRAM_WITH_SOURCE: &str = "clCreateProgramWithSource";

/// One source file, read whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSource {
    /// Where the text came from.
    pub path: PathBuf,
    /// File contents.
    pub text: String,
}

impl ProgramSource {
    /// Read `path` into memory.
    ///
    /// # Errors
    ///
    /// Returns [`CluError::SourceRead`] if the file cannot be opened, read
    /// or decoded as UTF-8.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| CluError::SourceRead {
            path: path.to_path_buf(),
            kind: err.kind(),
            message: err.to_string(),
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            text,
        })
    }
}

/// Read every file in `paths`, in order.
///
/// # Errors
///
/// `InvalidValue` for an empty list. The first unreadable file aborts the
/// whole read and nothing is returned.
pub fn read_program_sources<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<ProgramSource>> {
    if paths.is_empty() {
        return Err(CluError::InvalidValue("no program source files given".to_string()));
    }
    let mut sources = try_with_capacity(paths.len())?;
    for path in paths {
        sources.push(ProgramSource::read(path)?);
    }
    Ok(sources)
}

/// Create a program in `context` from the concatenated contents of `paths`.
///
/// # Errors
///
/// As [`read_program_sources`]; a driver failure is returned as
/// [`CluError::Api`] with the driver's status.
pub fn load_program<A, P>(api: &A, context: ContextId, paths: &[P]) -> Result<ProgramId>
where
    A: ProgramApi + ?Sized,
    P: AsRef<Path>,
{
    let sources = read_program_sources(paths)?;
    let texts: Vec<&str> = sources.iter().map(|source| source.text.as_str()).collect();
    let program = api
        .create_program_with_source(context, &texts)
        .map_err(|status| CluError::api(CREATE_PROGRAM_WITH_SOURCE, status))?;
    debug!(%context, %program, files = sources.len(), "created program from source");
    Ok(program)
}

/// Create a program in `context` from a single file.
///
/// # Errors
///
/// As [`load_program`].
pub fn load_program_file<A>(api: &A, context: ContextId, path: impl AsRef<Path>) -> Result<ProgramId>
where
    A: ProgramApi + ?Sized,
{
    load_program(api, context, &[path.as_ref()])
}
