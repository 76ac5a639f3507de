//! Session file loaders.
//!
//! Recordings live under `<data_dir>/<mouse_name>/<session>/`, one file per
//! data type:
//!
//! | tag              | file                           |
//! |------------------|--------------------------------|
//! | `events`         | `events.safetensors`           |
//! | `motion`         | `motion_tracking.safetensors`  |
//! | `deconv_calcium` | `deconv_calcium.safetensors`   |
//! | `raw_calcium`    | `raw_calcium.safetensors`      |
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::debug;

use crate::error::LoadError;
use crate::io::read_table;
use crate::table::Table;

/// Kind of recording stored for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// One row per trial with behavioural event times.
    Events,
    /// Pose-tracking time series.
    Motion,
    /// Deconvolved calcium activity.
    DeconvCalcium,
    /// Raw calcium fluorescence.
    RawCalcium,
}

impl DataType {
    pub const ALL: [DataType; 4] = [
        DataType::Events,
        DataType::Motion,
        DataType::DeconvCalcium,
        DataType::RawCalcium,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            DataType::Events => "events",
            DataType::Motion => "motion",
            DataType::DeconvCalcium => "deconv_calcium",
            DataType::RawCalcium => "raw_calcium",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            DataType::Events => "events.safetensors",
            DataType::Motion => "motion_tracking.safetensors",
            DataType::DeconvCalcium => "deconv_calcium.safetensors",
            DataType::RawCalcium => "raw_calcium.safetensors",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for DataType {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataType::ALL
            .into_iter()
            .find(|d| d.tag() == s)
            .ok_or_else(|| LoadError::UnknownDataType(s.to_string()))
    }
}

/// Path of one session file.
pub fn session_path(data_dir: &Path, mouse_name: &str, session: &str, data_type: DataType) -> PathBuf {
    data_dir.join(mouse_name).join(session).join(data_type.file_name())
}

/// Load one recording of one session.
///
/// With `add_meta_cols`, `mouse_name` and `session` are recorded in the
/// table metadata.
///
/// # Errors
///
/// [`LoadError::NotFound`] if the file is absent, [`LoadError::Read`] if it
/// cannot be decoded.
pub fn load_session_data(
    data_dir: &Path,
    mouse_name: &str,
    session: &str,
    data_type: DataType,
    add_meta_cols: bool,
) -> Result<Table, LoadError> {
    let path = session_path(data_dir, mouse_name, session, data_type);
    if !path.exists() {
        return Err(LoadError::NotFound(path));
    }
    let mut table = read_table(&path).map_err(|source| LoadError::Read {
        path: path.clone(),
        source,
    })?;
    debug!(path = %path.display(), rows = table.n_rows(), cols = table.n_cols(), "loaded session data");

    if add_meta_cols {
        table.metadata.insert("mouse_name".into(), mouse_name.into());
        table.metadata.insert("session".into(), session.into());
    }
    Ok(table)
}

/// Like [`load_session_data`] with the data type given as its string tag.
///
/// # Errors
///
/// [`LoadError::UnknownDataType`] for an unrecognised tag, otherwise as
/// [`load_session_data`].
pub fn load_session_data_by_tag(
    data_dir: &Path,
    mouse_name: &str,
    session: &str,
    data_type: &str,
    add_meta_cols: bool,
) -> Result<Table, LoadError> {
    let data_type: DataType = data_type.parse()?;
    load_session_data(data_dir, mouse_name, session, data_type, add_meta_cols)
}

pub fn load_events(data_dir: &Path, mouse_name: &str, session: &str, add_meta_cols: bool) -> Result<Table, LoadError> {
    load_session_data(data_dir, mouse_name, session, DataType::Events, add_meta_cols)
}

pub fn load_motion(data_dir: &Path, mouse_name: &str, session: &str, add_meta_cols: bool) -> Result<Table, LoadError> {
    load_session_data(data_dir, mouse_name, session, DataType::Motion, add_meta_cols)
}

pub fn load_deconv_calcium(
    data_dir: &Path,
    mouse_name: &str,
    session: &str,
    add_meta_cols: bool,
) -> Result<Table, LoadError> {
    load_session_data(data_dir, mouse_name, session, DataType::DeconvCalcium, add_meta_cols)
}

pub fn load_raw_calcium(
    data_dir: &Path,
    mouse_name: &str,
    session: &str,
    add_meta_cols: bool,
) -> Result<Table, LoadError> {
    load_session_data(data_dir, mouse_name, session, DataType::RawCalcium, add_meta_cols)
}
