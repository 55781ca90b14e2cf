//! Flat-text storage for vectors, clusters, and centers.
//!
//! The engine only ever sees in-memory arrays; this module owns the textual
//! formats around it:
//!
//! - vector sources: a directory of per-item `.txt` files (one component per
//!   line, file stem is the identifier) or a single delimited file (one line
//!   per vector, `id,v1,v2,...`),
//! - cluster output: one `.txt` file per label listing member identifiers,
//! - center output/input: one `.txt` file per center, one component per line,
//!   readable back for resuming classification without a refit.
//!
//! Directory loads read files in sorted filename order so repeated loads are
//! deterministic regardless of filesystem enumeration order.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while loading or saving flat-text artifacts.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error (file operations, disk I/O)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A token failed to parse as a number.
    #[error("parse error in {path} at line {line}: {token:?} is not a number")]
    Parse {
        path: PathBuf,
        line: usize,
        token: String,
    },

    /// Inconsistent or empty matrix shape.
    #[error("shape error: {0}")]
    Shape(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Controls whether writers truncate or extend existing artifacts.
///
/// `Append` supports the incremental flow: new items classified against
/// persisted centers are appended to the existing cluster files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    Overwrite,
    Append,
}

impl SaveMode {
    fn open(self, path: &Path) -> std::io::Result<File> {
        match self {
            SaveMode::Overwrite => File::create(path),
            SaveMode::Append => OpenOptions::new().create(true).append(true).open(path),
        }
    }
}

/// A loaded input matrix plus its parallel identifier list.
#[derive(Debug, Clone)]
pub struct VectorSet {
    data: Vec<f32>,
    ids: Vec<String>,
    dimension: usize,
}

impl VectorSet {
    /// Row-major flat matrix, `len() × dimension()`.
    #[must_use]
    pub fn vectors(&self) -> &[f32] {
        &self.data
    }

    /// Identifiers in the same order as the matrix rows.
    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Load vectors from a directory of per-item `.txt` files.
///
/// Each file holds one vector, one numeric component per line; the file stem
/// (name without extension) is the vector's identifier. Non-`.txt` entries
/// are ignored.
pub fn load_txt_dir(dir: impl AsRef<Path>) -> StoreResult<VectorSet> {
    let files = txt_files_sorted(dir.as_ref())?;
    if files.is_empty() {
        return Err(StoreError::Shape(format!(
            "no .txt vector files in {}",
            dir.as_ref().display()
        )));
    }

    let mut data = Vec::new();
    let mut ids = Vec::with_capacity(files.len());
    let mut dimension = 0;
    for path in files {
        let row = read_component_file(&path)?;
        if row.is_empty() {
            return Err(StoreError::Shape(format!(
                "{} has no components",
                path.display()
            )));
        }
        if ids.is_empty() {
            dimension = row.len();
        } else if row.len() != dimension {
            return Err(StoreError::Shape(format!(
                "{} has {} components, expected {}",
                path.display(),
                row.len(),
                dimension
            )));
        }
        ids.push(file_stem(&path));
        data.extend_from_slice(&row);
    }

    Ok(VectorSet {
        data,
        ids,
        dimension,
    })
}

/// Load vectors from a single delimited file.
///
/// One line per vector: the first comma-separated field is the identifier,
/// the remaining fields are numeric components. Blank lines are skipped.
pub fn load_csv(path: impl AsRef<Path>) -> StoreResult<VectorSet> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);

    let mut data = Vec::new();
    let mut ids = Vec::new();
    let mut dimension = 0;
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.split(',');
        // split always yields at least one field
        let id = fields.next().unwrap_or_default().trim().to_string();
        let mut row = Vec::new();
        for field in fields {
            let token = field.trim();
            let value: f32 = token.parse().map_err(|_| StoreError::Parse {
                path: path.to_path_buf(),
                line: line_no + 1,
                token: token.to_string(),
            })?;
            row.push(value);
        }
        if row.is_empty() {
            return Err(StoreError::Shape(format!(
                "{} line {} has an identifier but no components",
                path.display(),
                line_no + 1
            )));
        }
        if ids.is_empty() {
            dimension = row.len();
        } else if row.len() != dimension {
            return Err(StoreError::Shape(format!(
                "{} line {} has {} components, expected {}",
                path.display(),
                line_no + 1,
                row.len(),
                dimension
            )));
        }
        ids.push(id);
        data.extend_from_slice(&row);
    }
    if ids.is_empty() {
        return Err(StoreError::Shape(format!(
            "no vector rows in {}",
            path.display()
        )));
    }

    Ok(VectorSet {
        data,
        ids,
        dimension,
    })
}

/// Group member identifiers by cluster label, label-ordered.
#[must_use]
pub fn group_clusters(labels: &[usize], ids: &[String]) -> BTreeMap<usize, Vec<String>> {
    let mut groups: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    for (&label, id) in labels.iter().zip(ids) {
        groups.entry(label).or_default().push(id.clone());
    }
    groups
}

/// Write one `{prefix}_{label}.txt` per cluster, one member id per line.
pub fn write_clusters(
    dir: impl AsRef<Path>,
    prefix: &str,
    groups: &BTreeMap<usize, Vec<String>>,
    mode: SaveMode,
) -> StoreResult<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    for (label, members) in groups {
        let path = dir.join(format!("{prefix}_{label}.txt"));
        let mut writer = BufWriter::new(mode.open(&path)?);
        for member in members {
            writeln!(writer, "{member}")?;
        }
        writer.flush()?;
    }
    Ok(())
}

/// Write one `{prefix}_{i}.txt` per center, one component per line.
///
/// Indices are zero-padded to a fixed width so that sorted filename order
/// (which [`load_centers`] relies on) matches center order for any K.
pub fn write_centers(
    dir: impl AsRef<Path>,
    prefix: &str,
    centers: &[Vec<f32>],
    mode: SaveMode,
) -> StoreResult<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let width = index_width(centers.len());
    for (i, center) in centers.iter().enumerate() {
        let path = dir.join(format!("{prefix}_{i:0width$}.txt"));
        let mut writer = BufWriter::new(mode.open(&path)?);
        for component in center {
            writeln!(writer, "{component}")?;
        }
        writer.flush()?;
    }
    Ok(())
}

/// Read every `.txt` file in `dir` back into a center matrix, in sorted
/// filename order.
pub fn load_centers(dir: impl AsRef<Path>) -> StoreResult<Vec<Vec<f32>>> {
    let files = txt_files_sorted(dir.as_ref())?;
    if files.is_empty() {
        return Err(StoreError::Shape(format!(
            "no .txt center files in {}",
            dir.as_ref().display()
        )));
    }

    let mut centers: Vec<Vec<f32>> = Vec::with_capacity(files.len());
    for path in files {
        let center = read_component_file(&path)?;
        if center.is_empty() {
            return Err(StoreError::Shape(format!(
                "{} has no components",
                path.display()
            )));
        }
        if let Some(first) = centers.first() {
            if center.len() != first.len() {
                return Err(StoreError::Shape(format!(
                    "{} has {} components, expected {}",
                    path.display(),
                    center.len(),
                    first.len()
                )));
            }
        }
        centers.push(center);
    }
    Ok(centers)
}

/// `.txt` entries of a directory, sorted by filename.
fn txt_files_sorted(dir: &Path) -> StoreResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// One numeric component per line.
fn read_component_file(path: &Path) -> StoreResult<Vec<f32>> {
    let reader = BufReader::new(File::open(path)?);
    let mut values = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let token = line.trim();
        if token.is_empty() {
            continue;
        }
        let value: f32 = token.parse().map_err(|_| StoreError::Parse {
            path: path.to_path_buf(),
            line: line_no + 1,
            token: token.to_string(),
        })?;
        values.push(value);
    }
    Ok(values)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn index_width(count: usize) -> usize {
    count.saturating_sub(1).max(1).to_string().len()
}
