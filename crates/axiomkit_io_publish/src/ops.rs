//! Filesystem primitives behind each action kind.
//!
//! Every primitive runs its precondition checks first, in a fixed order, and
//! returns the first unmet one as a `Failed` or `WithWarnings` result without
//! touching the filesystem. Filesystem errors raised afterwards are converted
//! into `Failed` results; nothing here returns `Err`.

use std::fs;
use std::io;
use std::path::Path;

use chrono::Utc;

use crate::access::AccessChecker;
use crate::spec::{EnumAccessRight, EnumEntryKind, SpecActionResult, SpecPublishOptions};
use crate::util::{
    apply_file_metadata, combine_path, copy_file_bytes, derive_archive_directory_path,
    derive_archive_file_path, derive_archive_timestamp, derive_base_name, derive_parent_dir,
    find_last_existing_ancestor, write_zip_directory, write_zip_single_file,
};

type PrecheckResult = Result<(), SpecActionResult>;

fn can_write_directory(checker: &dyn AccessChecker, path_dir: &Path) -> bool {
    checker.has_access(path_dir, EnumEntryKind::Directory, EnumAccessRight::Write)
}

fn archive_parent_dir(c_archive: &str) -> String {
    derive_parent_dir(c_archive).unwrap_or_else(|| ".".to_string())
}

////////////////////////////////////////////////////////////////////////////////
// #region CreateDirectory

fn precheck_create_directory(c_dir: &str, checker: &dyn AccessChecker) -> PrecheckResult {
    let Some(path_ancestor) = find_last_existing_ancestor(Path::new(c_dir)) else {
        return Err(SpecActionResult::failed(format!(
            "Could not find an existing ancestor directory for ({c_dir})."
        )));
    };
    if c_dir.is_empty() {
        return Err(SpecActionResult::failed(format!(
            "Target directory path ({c_dir}) is not valid."
        )));
    }
    if !can_write_directory(checker, &path_ancestor) {
        return Err(SpecActionResult::failed(format!(
            "No write access to the existing ancestor directory ({}).",
            path_ancestor.display()
        )));
    }
    if Path::new(c_dir).is_dir() {
        return Err(SpecActionResult::with_warnings(format!(
            "Directory ({c_dir}) already exists."
        )));
    }
    Ok(())
}

/// Create `c_dir` and any missing parents.
pub fn create_directory(
    c_dir: &str,
    checker: &dyn AccessChecker,
    options: &SpecPublishOptions,
) -> SpecActionResult {
    if let Err(result) = precheck_create_directory(c_dir, checker) {
        return result;
    }
    if options.if_dry_run {
        return SpecActionResult::successful(format!(
            "Dry run: directory ({c_dir}) would be created."
        ));
    }
    match fs::create_dir_all(c_dir) {
        Ok(()) => SpecActionResult::successful(format!("Directory ({c_dir}) created.")),
        Err(e) => SpecActionResult::failed(format!("Failed to create directory ({c_dir}): {e}")),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CopyFile

fn precheck_copy_file(c_src: &str, c_dst: &str, checker: &dyn AccessChecker) -> PrecheckResult {
    if c_src.is_empty() {
        return Err(SpecActionResult::failed(format!("Source path ({c_src}) is not valid.")));
    }
    let path_file_src = Path::new(c_src);
    if !path_file_src.is_file() {
        return Err(SpecActionResult::failed(format!("Source file ({c_src}) does not exist.")));
    }
    if !checker.has_access(path_file_src, EnumEntryKind::File, EnumAccessRight::Read) {
        return Err(SpecActionResult::failed(format!(
            "No read access to source file ({c_src})."
        )));
    }
    if c_dst.is_empty() {
        return Err(SpecActionResult::failed(format!("Target path ({c_dst}) is not valid.")));
    }
    let c_dst_parent = derive_parent_dir(c_dst).unwrap_or_default();
    let path_dir_dst_parent = Path::new(&c_dst_parent);
    if c_dst_parent.is_empty() || !path_dir_dst_parent.is_dir() {
        return Err(SpecActionResult::failed(format!(
            "Target directory ({c_dst_parent}) does not exist."
        )));
    }
    if !can_write_directory(checker, path_dir_dst_parent) {
        return Err(SpecActionResult::failed(format!(
            "No write access to target directory ({c_dst_parent})."
        )));
    }
    Ok(())
}

/// Copy `c_src` to the file path `c_dst`.
///
/// Without `if_overwrite` an existing target is left untouched and the copy fails.
pub fn copy_file_to_file(
    c_src: &str,
    c_dst: &str,
    if_overwrite: bool,
    checker: &dyn AccessChecker,
    options: &SpecPublishOptions,
) -> SpecActionResult {
    if let Err(result) = precheck_copy_file(c_src, c_dst, checker) {
        return result;
    }
    if options.if_dry_run {
        return SpecActionResult::successful(format!(
            "Dry run: file would be copied ({c_src} => {c_dst})."
        ));
    }

    let path_file_src = Path::new(c_src);
    let path_file_dst = Path::new(c_dst);
    if let Err(e) = copy_file_bytes(path_file_src, path_file_dst, if_overwrite) {
        if e.kind() == io::ErrorKind::AlreadyExists {
            return SpecActionResult::failed(format!(
                "Target file ({c_dst}) already exists and overwrite was not requested."
            ));
        }
        return SpecActionResult::failed(format!("Failed to copy file ({c_src} => {c_dst}): {e}"));
    }

    if options.if_preserve_metadata
        && let Err(e) = apply_file_metadata(path_file_src, path_file_dst)
    {
        return SpecActionResult::with_warnings(format!(
            "File copied ({c_src} => {c_dst}) but metadata was not preserved: {e}"
        ));
    }
    SpecActionResult::successful(format!("File copied ({c_src} => {c_dst})."))
}

/// Copy `c_src` into the directory `c_dir_dst`, keeping its file name.
pub fn copy_file_to_directory(
    c_src: &str,
    c_dir_dst: &str,
    if_overwrite: bool,
    checker: &dyn AccessChecker,
    options: &SpecPublishOptions,
) -> SpecActionResult {
    if c_src.is_empty() {
        return SpecActionResult::failed(format!("Source path ({c_src}) is not valid."));
    }
    if c_dir_dst.is_empty() {
        return SpecActionResult::failed(format!("Target path ({c_dir_dst}) is not valid."));
    }
    let Some(c_file_name) = derive_base_name(c_src) else {
        return SpecActionResult::failed(format!("Source path ({c_src}) is not valid."));
    };
    let c_dst = combine_path(c_dir_dst, &[&c_file_name]);
    copy_file_to_file(c_src, &c_dst, if_overwrite, checker, options)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Archive

fn precheck_archive_file(
    c_file: &str,
    c_archive: &str,
    if_overwrite: bool,
    checker: &dyn AccessChecker,
) -> PrecheckResult {
    if c_archive.is_empty() {
        return Err(SpecActionResult::failed(format!(
            "Archive path for ({c_file}) could not be determined."
        )));
    }
    let path_file = Path::new(c_file);
    if !path_file.is_file() {
        return Err(SpecActionResult::with_warnings(format!(
            "File ({c_file}) does not exist; nothing archived."
        )));
    }
    if !checker.has_access(path_file, EnumEntryKind::File, EnumAccessRight::Read) {
        return Err(SpecActionResult::failed(format!(
            "No read access to source file ({c_file})."
        )));
    }
    if !if_overwrite && Path::new(c_archive).exists() {
        return Err(SpecActionResult::with_warnings(format!(
            "Archive ({c_archive}) already exists."
        )));
    }
    let c_archive_dir = archive_parent_dir(c_archive);
    if !can_write_directory(checker, Path::new(&c_archive_dir)) {
        return Err(SpecActionResult::failed(format!(
            "No write access to archive directory ({c_archive_dir})."
        )));
    }
    Ok(())
}

/// Zip `c_file` as the single entry of an archive.
///
/// A missing or empty `c_archive` is replaced by a timestamped name next to the file.
pub fn archive_file(
    c_file: &str,
    c_archive: Option<&str>,
    if_overwrite: bool,
    checker: &dyn AccessChecker,
    options: &SpecPublishOptions,
) -> SpecActionResult {
    let c_archive = match c_archive {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => derive_archive_file_path(c_file, &derive_archive_timestamp(Utc::now()))
            .unwrap_or_default(),
    };
    if let Err(result) = precheck_archive_file(c_file, &c_archive, if_overwrite, checker) {
        return result;
    }
    if options.if_dry_run {
        return SpecActionResult::successful(format!(
            "Dry run: file would be archived ({c_file} => {c_archive})."
        ));
    }

    let path_archive = Path::new(&c_archive);
    if path_archive.exists()
        && let Err(e) = fs::remove_file(path_archive)
    {
        return SpecActionResult::failed(format!(
            "Failed to delete existing archive ({c_archive}): {e}"
        ));
    }
    match write_zip_single_file(Path::new(c_file), path_archive, options.n_compression_level) {
        Ok(()) => SpecActionResult::successful(format!("File archived ({c_file} => {c_archive}).")),
        Err(e) => SpecActionResult::failed(format!(
            "Failed to archive file ({c_file} => {c_archive}): {e}"
        )),
    }
}

fn precheck_archive_directory(
    c_dir: &str,
    c_archive: &str,
    if_overwrite: bool,
    checker: &dyn AccessChecker,
) -> PrecheckResult {
    if c_archive.is_empty() {
        return Err(SpecActionResult::failed(format!(
            "Archive path for ({c_dir}) could not be determined."
        )));
    }
    if !if_overwrite && Path::new(c_archive).exists() {
        return Err(SpecActionResult::with_warnings(format!(
            "Archive ({c_archive}) already exists."
        )));
    }
    if !checker.has_access(Path::new(c_dir), EnumEntryKind::Directory, EnumAccessRight::Read) {
        return Err(SpecActionResult::failed(format!(
            "No read access to source directory ({c_dir})."
        )));
    }
    let c_archive_dir = archive_parent_dir(c_archive);
    if !can_write_directory(checker, Path::new(&c_archive_dir)) {
        return Err(SpecActionResult::failed(format!(
            "No write access to archive directory ({c_archive_dir})."
        )));
    }
    Ok(())
}

/// Zip the whole tree under `c_dir`; entry names exclude the directory itself.
pub fn archive_directory(
    c_dir: &str,
    c_archive: Option<&str>,
    if_overwrite: bool,
    checker: &dyn AccessChecker,
    options: &SpecPublishOptions,
) -> SpecActionResult {
    if !Path::new(c_dir).is_dir() {
        return SpecActionResult::with_warnings(format!(
            "Directory ({c_dir}) does not exist; nothing archived."
        ));
    }
    let c_archive = match c_archive {
        Some(c) if !c.trim().is_empty() => c.to_string(),
        _ => derive_archive_directory_path(c_dir, &derive_archive_timestamp(Utc::now()))
            .unwrap_or_default(),
    };
    if let Err(result) = precheck_archive_directory(c_dir, &c_archive, if_overwrite, checker) {
        return result;
    }
    if options.if_dry_run {
        return SpecActionResult::successful(format!(
            "Dry run: directory would be archived ({c_dir} => {c_archive})."
        ));
    }

    let path_archive = Path::new(&c_archive);
    if path_archive.exists()
        && let Err(e) = fs::remove_file(path_archive)
    {
        return SpecActionResult::failed(format!(
            "Failed to delete existing archive ({c_archive}): {e}"
        ));
    }
    match write_zip_directory(Path::new(c_dir), path_archive, options.n_compression_level) {
        Ok(n_files) => SpecActionResult::successful(format!(
            "Directory archived ({c_dir} => {c_archive}), {n_files} file(s)."
        )),
        Err(e) => SpecActionResult::failed(format!(
            "Failed to archive directory ({c_dir} => {c_archive}): {e}"
        )),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::Read;

    use super::*;
    use crate::access::{
        EnumPrincipal, SpecAccessRule, StaticAccessRuleSource, checker_allow_all,
        checker_with_source,
    };
    use crate::spec::EnumActionResultType;

    fn path_string(path: &Path) -> String {
        path.to_string_lossy().to_string()
    }

    fn read_zip_entry(path_archive: &Path, c_name: &str) -> String {
        let file_archive = File::open(path_archive).expect("open zip");
        let mut zip_archive = zip::ZipArchive::new(file_archive).expect("read zip");
        let mut entry = zip_archive.by_name(c_name).expect("zip entry");
        let mut c_content = String::new();
        entry.read_to_string(&mut c_content).expect("read entry");
        c_content
    }

    fn zip_entry_names(path_archive: &Path) -> Vec<String> {
        let file_archive = File::open(path_archive).expect("open zip");
        let zip_archive = zip::ZipArchive::new(file_archive).expect("read zip");
        let mut l_names: Vec<String> = zip_archive.file_names().map(str::to_string).collect();
        l_names.sort();
        l_names
    }

    #[test]
    fn create_directory_is_idempotent() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let c_dir = path_string(&tmp.path().join("a").join("b"));
        let options = SpecPublishOptions::default();

        let result_first = create_directory(&c_dir, &checker_allow_all(), &options);
        assert!(result_first.is_successful(), "{result_first:?}");
        assert!(Path::new(&c_dir).is_dir());

        let result_second = create_directory(&c_dir, &checker_allow_all(), &options);
        assert_eq!(result_second.result_type, EnumActionResultType::WithWarnings);
    }

    #[test]
    fn create_directory_requires_write_on_existing_ancestor() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let checker = checker_with_source(StaticAccessRuleSource::new().with_rules(
            tmp.path(),
            vec![SpecAccessRule::deny(EnumPrincipal::User(1000), &[EnumAccessRight::Write])],
        ));
        let c_dir = path_string(&tmp.path().join("new").join("deep"));

        let result = create_directory(&c_dir, &checker, &SpecPublishOptions::default());
        assert!(result.is_failed());
        assert!(!tmp.path().join("new").exists());
    }

    #[test]
    fn copy_file_to_file_fails_on_missing_source_or_target_parent() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let c_src = path_string(&tmp.path().join("missing.txt"));
        let c_dst = path_string(&tmp.path().join("out.txt"));
        let options = SpecPublishOptions::default();

        let result = copy_file_to_file(&c_src, &c_dst, false, &checker_allow_all(), &options);
        assert!(result.is_failed());
        assert!(result.message.as_deref().unwrap_or_default().contains("does not exist"));

        fs::write(&c_src, "x").expect("write src");
        let c_dst_orphan = path_string(&tmp.path().join("nope").join("out.txt"));
        let result =
            copy_file_to_file(&c_src, &c_dst_orphan, false, &checker_allow_all(), &options);
        assert!(result.is_failed());

        let result = copy_file_to_file("", &c_dst, false, &checker_allow_all(), &options);
        assert!(result.is_failed());
    }

    #[test]
    fn copy_file_to_file_respects_overwrite_flag() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let c_src = path_string(&tmp.path().join("src.txt"));
        let c_dst = path_string(&tmp.path().join("dst.txt"));
        fs::write(&c_src, "new").expect("write src");
        fs::write(&c_dst, "old").expect("write dst");
        let options = SpecPublishOptions::default();

        let result = copy_file_to_file(&c_src, &c_dst, false, &checker_allow_all(), &options);
        assert!(result.is_failed());
        assert_eq!(fs::read_to_string(&c_dst).expect("read dst"), "old");

        let result = copy_file_to_file(&c_src, &c_dst, true, &checker_allow_all(), &options);
        assert!(result.is_successful(), "{result:?}");
        assert_eq!(fs::read_to_string(&c_dst).expect("read dst"), "new");
    }

    #[test]
    fn copy_file_to_file_denied_read_fails_before_copy() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_src = tmp.path().join("secret.txt");
        fs::write(&path_src, "x").expect("write src");
        let checker = checker_with_source(StaticAccessRuleSource::new().with_rules(
            path_src.as_path(),
            vec![SpecAccessRule::deny(EnumPrincipal::User(1000), &[EnumAccessRight::Read])],
        ));
        let c_dst = path_string(&tmp.path().join("copy.txt"));

        let options = SpecPublishOptions::default();
        let result = copy_file_to_file(&path_string(&path_src), &c_dst, true, &checker, &options);
        assert!(result.is_failed());
        assert!(!Path::new(&c_dst).exists());
    }

    #[test]
    fn copy_file_preserves_modification_time() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_src = tmp.path().join("src.txt");
        fs::write(&path_src, "x").expect("write src");
        let file_time_old = filetime::FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_mtime(&path_src, file_time_old).expect("set mtime");
        let c_dst = path_string(&tmp.path().join("dst.txt"));

        let result = copy_file_to_file(
            &path_string(&path_src),
            &c_dst,
            false,
            &checker_allow_all(),
            &SpecPublishOptions::default(),
        );
        assert!(result.is_successful(), "{result:?}");
        let stat_dst = fs::metadata(&c_dst).expect("metadata");
        assert_eq!(filetime::FileTime::from_last_modification_time(&stat_dst), file_time_old);
    }

    #[test]
    fn copy_file_to_directory_keeps_file_name() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_src = tmp.path().join("report.txt");
        fs::write(&path_src, "report").expect("write src");
        let path_dir_dst = tmp.path().join("b");
        fs::create_dir(&path_dir_dst).expect("create dst");

        let result = copy_file_to_directory(
            &path_string(&path_src),
            &path_string(&path_dir_dst),
            true,
            &checker_allow_all(),
            &SpecPublishOptions::default(),
        );
        assert!(result.is_successful(), "{result:?}");
        assert_eq!(
            fs::read_to_string(path_dir_dst.join("report.txt")).expect("read copy"),
            "report"
        );
    }

    #[test]
    fn archive_file_round_trip_holds_single_entry() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_src = tmp.path().join("report.txt");
        fs::write(&path_src, "quarterly").expect("write src");
        let path_archive = tmp.path().join("report.zip");
        let c_archive = path_string(&path_archive);

        let result = archive_file(
            &path_string(&path_src),
            Some(c_archive.as_str()),
            false,
            &checker_allow_all(),
            &SpecPublishOptions::default(),
        );
        assert!(result.is_successful(), "{result:?}");
        assert_eq!(zip_entry_names(&path_archive), vec!["report.txt".to_string()]);
        assert_eq!(read_zip_entry(&path_archive, "report.txt"), "quarterly");

        let result = archive_file(
            &path_string(&path_src),
            Some(c_archive.as_str()),
            false,
            &checker_allow_all(),
            &SpecPublishOptions::default(),
        );
        assert_eq!(result.result_type, EnumActionResultType::WithWarnings);

        fs::write(&path_src, "annual").expect("rewrite src");
        let result = archive_file(
            &path_string(&path_src),
            Some(c_archive.as_str()),
            true,
            &checker_allow_all(),
            &SpecPublishOptions::default(),
        );
        assert!(result.is_successful(), "{result:?}");
        assert_eq!(read_zip_entry(&path_archive, "report.txt"), "annual");
    }

    #[test]
    fn archive_file_synthesizes_timestamped_name_and_warns_on_missing_source() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_src = tmp.path().join("report.txt");
        fs::write(&path_src, "x").expect("write src");

        let result = archive_file(
            &path_string(&path_src),
            None,
            false,
            &checker_allow_all(),
            &SpecPublishOptions::default(),
        );
        assert!(result.is_successful(), "{result:?}");
        let l_zips: Vec<String> = fs::read_dir(tmp.path())
            .expect("read dir")
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|name| name.ends_with(".zip"))
            .collect();
        assert_eq!(l_zips.len(), 1);
        assert!(l_zips[0].starts_with("report_"));

        let result = archive_file(
            &path_string(&tmp.path().join("missing.txt")),
            None,
            false,
            &checker_allow_all(),
            &SpecPublishOptions::default(),
        );
        assert_eq!(result.result_type, EnumActionResultType::WithWarnings);
    }

    #[test]
    fn archive_directory_entries_are_relative_to_the_directory() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_dir = tmp.path().join("site");
        fs::create_dir_all(path_dir.join("css")).expect("create css");
        fs::create_dir_all(path_dir.join("empty")).expect("create empty");
        fs::write(path_dir.join("index.html"), "<html/>").expect("write index");
        fs::write(path_dir.join("css").join("main.css"), "body{}").expect("write css");
        let path_archive = tmp.path().join("site.zip");

        let result = archive_directory(
            &path_string(&path_dir),
            Some(path_string(&path_archive).as_str()),
            false,
            &checker_allow_all(),
            &SpecPublishOptions::default(),
        );
        assert!(result.is_successful(), "{result:?}");
        assert_eq!(
            zip_entry_names(&path_archive),
            vec!["css/", "css/main.css", "empty/", "index.html"]
        );
        assert_eq!(read_zip_entry(&path_archive, "css/main.css"), "body{}");
    }

    #[test]
    fn archive_directory_warns_when_directory_is_missing() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let result = archive_directory(
            &path_string(&tmp.path().join("gone")),
            None,
            true,
            &checker_allow_all(),
            &SpecPublishOptions::default(),
        );
        assert_eq!(result.result_type, EnumActionResultType::WithWarnings);
    }

    #[test]
    fn dry_run_checks_preconditions_without_mutation() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let options = SpecPublishOptions {
            if_dry_run: true,
            ..SpecPublishOptions::default()
        };
        let path_src = tmp.path().join("src.txt");
        fs::write(&path_src, "x").expect("write src");
        let c_dir = path_string(&tmp.path().join("new"));
        let c_dst = path_string(&tmp.path().join("dst.txt"));

        assert!(create_directory(&c_dir, &checker_allow_all(), &options).is_successful());
        assert!(!Path::new(&c_dir).exists());

        let c_src = path_string(&path_src);
        let result = copy_file_to_file(&c_src, &c_dst, false, &checker_allow_all(), &options);
        assert!(result.is_successful(), "{result:?}");
        assert!(!Path::new(&c_dst).exists());

        let c_missing = path_string(&tmp.path().join("nope"));
        let result = copy_file_to_file(&c_missing, &c_dst, false, &checker_allow_all(), &options);
        assert!(result.is_failed());
    }

    fn checker_denying_write(path: &Path) -> crate::access::RuleAccessChecker<StaticAccessRuleSource> {
        checker_with_source(StaticAccessRuleSource::new().with_rules(
            path,
            vec![SpecAccessRule::deny(EnumPrincipal::User(1000), &[EnumAccessRight::Write])],
        ))
    }

    fn make_site(root: &Path) -> std::path::PathBuf {
        let path_dir = root.join("site");
        fs::create_dir_all(&path_dir).expect("create site");
        fs::write(path_dir.join("a.txt"), "a").expect("write a");
        path_dir
    }

    #[test]
    fn archive_directory_existing_archive_warns_then_overwrite_rewrites() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_dir = make_site(tmp.path());
        let c_dir = path_string(&path_dir);
        let path_archive = tmp.path().join("site.zip");
        let c_archive = path_string(&path_archive);
        let options = SpecPublishOptions::default();

        let result = archive_directory(&c_dir, Some(c_archive.as_str()), false, &checker_allow_all(), &options);
        assert!(result.is_successful(), "{result:?}");
        let raw_first = fs::read(&path_archive).expect("read zip");

        fs::write(path_dir.join("b.txt"), "b").expect("write b");
        let result = archive_directory(&c_dir, Some(c_archive.as_str()), false, &checker_allow_all(), &options);
        assert_eq!(result.result_type, EnumActionResultType::WithWarnings);
        assert_eq!(fs::read(&path_archive).expect("read zip"), raw_first);

        let result = archive_directory(&c_dir, Some(c_archive.as_str()), true, &checker_allow_all(), &options);
        assert!(result.is_successful(), "{result:?}");
        assert_eq!(zip_entry_names(&path_archive), vec!["a.txt", "b.txt"]);
        assert_eq!(read_zip_entry(&path_archive, "b.txt"), "b");
    }

    #[test]
    fn archive_directory_denied_archive_directory_write_fails_untouched() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_dir = make_site(tmp.path());
        let path_archive = tmp.path().join("site.zip");
        let checker = checker_denying_write(tmp.path());

        let result = archive_directory(
            &path_string(&path_dir),
            Some(path_string(&path_archive).as_str()),
            true,
            &checker,
            &SpecPublishOptions::default(),
        );
        assert!(result.is_failed());
        assert!(result.message.as_deref().unwrap_or_default().contains("No write access"));
        assert!(!path_archive.exists());
    }

    #[test]
    fn archive_file_denied_archive_directory_write_keeps_existing_archive() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_src = tmp.path().join("report.txt");
        fs::write(&path_src, "report").expect("write src");
        let path_archive = tmp.path().join("report.zip");
        fs::write(&path_archive, "previous").expect("write archive");
        let checker = checker_denying_write(tmp.path());

        let result = archive_file(
            &path_string(&path_src),
            Some(path_string(&path_archive).as_str()),
            true,
            &checker,
            &SpecPublishOptions::default(),
        );
        assert!(result.is_failed());
        assert_eq!(fs::read_to_string(&path_archive).expect("read archive"), "previous");
    }

    #[test]
    fn copy_file_to_file_denied_target_directory_write_fails_before_copy() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_src = tmp.path().join("src.txt");
        fs::write(&path_src, "x").expect("write src");
        let path_dir_out = tmp.path().join("out");
        fs::create_dir(&path_dir_out).expect("create out");
        let path_dst = path_dir_out.join("dst.txt");
        let checker = checker_denying_write(&path_dir_out);

        let result = copy_file_to_file(
            &path_string(&path_src),
            &path_string(&path_dst),
            true,
            &checker,
            &SpecPublishOptions::default(),
        );
        assert!(result.is_failed());
        assert!(result.message.as_deref().unwrap_or_default().contains("No write access"));
        assert!(!path_dst.exists());
    }
}
