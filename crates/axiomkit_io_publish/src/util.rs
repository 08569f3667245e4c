use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

use chrono::{DateTime, Datelike, Timelike, Utc};
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::spec::PublishIoError;

////////////////////////////////////////////////////////////////////////////////
// #region PathStrings

fn _is_separator(c: char) -> bool {
    c == '/' || c == MAIN_SEPARATOR
}

/// Append the platform separator unless `path` already ends with one.
pub(crate) fn append_dir_separator(path: &str) -> String {
    if path.is_empty() || path.ends_with(_is_separator) {
        return path.to_string();
    }
    format!("{path}{MAIN_SEPARATOR}")
}

/// Join path strings with exactly one separator between non-empty parts.
///
/// Leading separators of every part after the first are dropped, so a
/// remainder such as `/sub` cannot replace `base` the way `Path::join` would.
pub(crate) fn combine_path(base: &str, parts: &[&str]) -> String {
    let mut c_path = base.to_string();
    for part in parts {
        let part = part.trim_start_matches(_is_separator);
        if part.is_empty() {
            continue;
        }
        if !c_path.is_empty() && !c_path.ends_with(_is_separator) {
            c_path.push(MAIN_SEPARATOR);
        }
        c_path.push_str(part);
    }
    c_path
}

/// Strip the literal `prefix` string from `path`.
///
/// This is string-prefix semantics: `/data` strips from `/data2/x` leaving `2/x`.
pub(crate) fn strip_path_prefix<'a>(path: &'a str, prefix: &str) -> &'a str {
    path.strip_prefix(prefix).unwrap_or(path)
}

/// Final path component after trimming trailing separators.
pub(crate) fn derive_base_name(path: &str) -> Option<String> {
    let c_trimmed = path.trim_end_matches(_is_separator);
    Path::new(c_trimmed)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
}

/// Parent directory string of `path`; an empty parent is the current directory.
pub(crate) fn derive_parent_dir(path: &str) -> Option<String> {
    let path_parent = Path::new(path).parent()?;
    if path_parent.as_os_str().is_empty() {
        return Some(".".to_string());
    }
    Some(path_parent.to_string_lossy().to_string())
}

/// Nearest ancestor of `path` (itself included) that exists as a directory.
pub(crate) fn find_last_existing_ancestor(path: &Path) -> Option<PathBuf> {
    for path_ancestor in path.ancestors() {
        let path_ancestor = if path_ancestor.as_os_str().is_empty() {
            Path::new(".")
        } else {
            path_ancestor
        };
        if path_ancestor.is_dir() {
            return Some(path_ancestor.to_path_buf());
        }
    }
    None
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ArchiveNaming

/// `_<year>_<month>_<day>_<hour>_<minute>_<second>`, UTC, no zero-padding.
pub(crate) fn derive_archive_timestamp(dt: DateTime<Utc>) -> String {
    format!(
        "_{}_{}_{}_{}_{}_{}",
        dt.year(),
        dt.month(),
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second()
    )
}

/// `<dir>/<file stem><timestamp>.zip` next to `path_file`.
pub(crate) fn derive_archive_file_path(path_file: &str, c_timestamp: &str) -> Option<String> {
    if path_file.is_empty() {
        return None;
    }
    let path_file = Path::new(path_file);
    let c_stem = path_file.file_stem()?.to_string_lossy();
    let path_archive = path_file.with_file_name(format!("{c_stem}{c_timestamp}.zip"));
    Some(path_archive.to_string_lossy().to_string())
}

/// `<parent>/<dir name><timestamp>.zip` next to `path_dir`.
pub(crate) fn derive_archive_directory_path(path_dir: &str, c_timestamp: &str) -> Option<String> {
    let c_trimmed = path_dir.trim_end_matches(_is_separator);
    if c_trimmed.is_empty() {
        return None;
    }
    let path_dir = Path::new(c_trimmed);
    let c_name = path_dir.file_name()?.to_string_lossy();
    let path_archive = path_dir.with_file_name(format!("{c_name}{c_timestamp}.zip"));
    Some(path_archive.to_string_lossy().to_string())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FileCopy

/// Copy file bytes; without `if_overwrite` the target is opened create-new.
pub(crate) fn copy_file_bytes(
    path_file_src: &Path,
    path_file_dst: &Path,
    if_overwrite: bool,
) -> Result<u64, io::Error> {
    if if_overwrite {
        return fs::copy(path_file_src, path_file_dst);
    }
    let mut file_src = File::open(path_file_src)?;
    let mut file_dst = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path_file_dst)?;
    let n_bytes = io::copy(&mut file_src, &mut file_dst)?;
    fs::set_permissions(path_file_dst, file_src.metadata()?.permissions())?;
    Ok(n_bytes)
}

/// Carry permissions, access/modify times and (Linux) xattrs from `src` to `dst`.
pub(crate) fn apply_file_metadata(
    path_file_src: &Path,
    path_file_dst: &Path,
) -> Result<(), io::Error> {
    use filetime::{FileTime, set_file_times};

    let stat_src = fs::metadata(path_file_src)?;
    fs::set_permissions(path_file_dst, stat_src.permissions())?;

    let file_time_access = FileTime::from_last_access_time(&stat_src);
    let file_time_modify = FileTime::from_last_modification_time(&stat_src);
    set_file_times(path_file_dst, file_time_access, file_time_modify)?;

    #[cfg(target_os = "linux")]
    copy_xattrs_linux(path_file_src, path_file_dst);
    Ok(())
}

#[cfg(target_os = "linux")]
fn copy_xattrs_linux(path_file_src: &Path, path_file_dst: &Path) {
    let iter_xattr_names = match xattr::list(path_file_src) {
        Ok(v) => v,
        Err(_) => return,
    };

    for name in iter_xattr_names {
        let Some(raw_value) = xattr::get(path_file_src, &name).ok().flatten() else {
            continue;
        };
        let _ = xattr::set(path_file_dst, &name, &raw_value);
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ZipWriters

fn _zip_options(n_compression_level: Option<i64>) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(n_compression_level)
}

/// Create `path_archive` holding `path_file` as its single entry, named by basename.
pub(crate) fn write_zip_single_file(
    path_file: &Path,
    path_archive: &Path,
    n_compression_level: Option<i64>,
) -> Result<(), PublishIoError> {
    let c_entry_name = path_file
        .file_name()
        .ok_or_else(|| PublishIoError::InvalidPath(path_file.to_path_buf()))?
        .to_string_lossy()
        .to_string();

    let file_archive = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path_archive)?;
    let mut zip_writer = ZipWriter::new(file_archive);
    zip_writer.start_file(c_entry_name, _zip_options(n_compression_level))?;
    let mut file_src = File::open(path_file)?;
    io::copy(&mut file_src, &mut zip_writer)?;
    zip_writer.finish()?;
    Ok(())
}

/// Zip the whole tree under `path_dir`; entry names are relative to it.
///
/// Returns the number of file entries written.
pub(crate) fn write_zip_directory(
    path_dir: &Path,
    path_archive: &Path,
    n_compression_level: Option<i64>,
) -> Result<u64, PublishIoError> {
    let file_archive = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path_archive)?;
    let path_archive_abs = fs::canonicalize(path_archive)?;
    let mut zip_writer = ZipWriter::new(file_archive);

    let mut n_files = 0_u64;
    for entry_res in WalkDir::new(path_dir).min_depth(1).sort_by_file_name() {
        let entry = entry_res?;
        let path_rel = entry
            .path()
            .strip_prefix(path_dir)
            .map_err(|_| PublishIoError::InvalidPath(entry.path().to_path_buf()))?;
        let c_entry_name = path_rel
            .components()
            .map(|part| part.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if entry.file_type().is_dir() {
            zip_writer
                .add_directory(format!("{c_entry_name}/"), _zip_options(n_compression_level))?;
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }
        if fs::canonicalize(entry.path()).is_ok_and(|p| p == path_archive_abs) {
            continue;
        }
        zip_writer.start_file(c_entry_name, _zip_options(n_compression_level))?;
        let mut file_src = File::open(entry.path())?;
        io::copy(&mut file_src, &mut zip_writer)?;
        n_files += 1;
    }
    zip_writer.finish()?;
    Ok(n_files)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
