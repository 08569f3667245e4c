//! Expansion of publication rules into planned filesystem actions.
//!
//! The returned list follows rule and destination declaration order; use
//! [`crate::order::order_actions`] to obtain the execution order.

use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::access::AccessChecker;
use crate::spec::{
    EnumAccessRight, EnumActionKind, EnumEntryKind, EnumPublishMode, EnumSourceKind,
    EnumTargetKind, SpecAction, SpecDestination, SpecPublishRule,
};
use crate::util::{
    append_dir_separator, combine_path, derive_base_name, derive_parent_dir, strip_path_prefix,
};

/// Plan every rule × destination pair.
///
/// Directory sources are walked at plan time; a missing or unreadable source
/// directory plans nothing for that destination.
pub fn generate_plan(rules: &[SpecPublishRule], checker: &dyn AccessChecker) -> Vec<SpecAction> {
    let mut l_actions = Vec::new();
    for rule in rules {
        for destination in &rule.destinations {
            let n_before = l_actions.len();
            match (rule.source_kind, destination.target_kind) {
                (EnumSourceKind::File, EnumTargetKind::File) => {
                    plan_file_to_file(rule, destination, &mut l_actions)
                }
                (EnumSourceKind::File, EnumTargetKind::Directory) => {
                    plan_file_to_directory(rule, destination, &mut l_actions)
                }
                (EnumSourceKind::File, EnumTargetKind::Archive) => {
                    plan_file_to_archive(rule, destination, &mut l_actions)
                }
                (EnumSourceKind::Directory, EnumTargetKind::Directory) => {
                    plan_directory_to_directory(rule, destination, checker, &mut l_actions)
                }
                (EnumSourceKind::Directory, EnumTargetKind::Archive) => {
                    plan_directory_to_archive(rule, destination, &mut l_actions)
                }
                (EnumSourceKind::Directory, EnumTargetKind::File) => {
                    debug!(
                        rule = %rule.name,
                        target = %destination.path_target,
                        "directory source cannot publish to a file target; skipped"
                    );
                }
            }
            debug!(
                rule = %rule.name,
                source = %rule.path_source,
                target = %destination.path_target,
                n_actions = l_actions.len() - n_before,
                "planned destination"
            );
        }
    }
    l_actions
}

fn select_kind(
    if_overwrite: bool,
    kind: EnumActionKind,
    kind_overwrite: EnumActionKind,
) -> EnumActionKind {
    if if_overwrite { kind_overwrite } else { kind }
}

////////////////////////////////////////////////////////////////////////////////
// #region FileSources

fn plan_file_to_file(
    rule: &SpecPublishRule,
    destination: &SpecDestination,
    l_actions: &mut Vec<SpecAction>,
) {
    let c_target = destination.path_target.as_str();
    if rule.has_mode(destination, EnumPublishMode::Archive) {
        l_actions.push(SpecAction::archive_auto_named(EnumActionKind::ArchiveFile, c_target));
    }
    // A target without a parent plans an empty directory, which fails at execution.
    let c_parent = derive_parent_dir(c_target).unwrap_or_default();
    l_actions.push(SpecAction::create_directory(append_dir_separator(&c_parent)));
    let kind = select_kind(
        rule.has_mode(destination, EnumPublishMode::Overwrite),
        EnumActionKind::CopyFileToFile,
        EnumActionKind::CopyFileToFileOverwrite,
    );
    l_actions.push(SpecAction::with_source_target(kind, rule.path_source.as_str(), c_target));
}

fn plan_file_to_directory(
    rule: &SpecPublishRule,
    destination: &SpecDestination,
    l_actions: &mut Vec<SpecAction>,
) {
    let c_target = destination.path_target.as_str();
    if rule.has_mode(destination, EnumPublishMode::Archive)
        && let Some(c_file_name) = derive_base_name(&rule.path_source)
    {
        l_actions.push(SpecAction::archive_auto_named(
            EnumActionKind::ArchiveFile,
            combine_path(c_target, &[&c_file_name]),
        ));
    }
    let kind = select_kind(
        rule.has_mode(destination, EnumPublishMode::Overwrite),
        EnumActionKind::CopyFileToDirectory,
        EnumActionKind::CopyFileToDirectoryOverwrite,
    );
    l_actions.push(SpecAction::with_source_target(kind, rule.path_source.as_str(), c_target));
}

fn plan_file_to_archive(
    rule: &SpecPublishRule,
    destination: &SpecDestination,
    l_actions: &mut Vec<SpecAction>,
) {
    let kind = select_kind(
        rule.has_mode(destination, EnumPublishMode::Overwrite),
        EnumActionKind::ArchiveFile,
        EnumActionKind::ArchiveFileOverwrite,
    );
    l_actions.push(SpecAction::with_source_target(
        kind,
        rule.path_source.as_str(),
        destination.path_target.as_str(),
    ));
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DirectorySources

fn plan_directory_to_directory(
    rule: &SpecPublishRule,
    destination: &SpecDestination,
    checker: &dyn AccessChecker,
    l_actions: &mut Vec<SpecAction>,
) {
    if rule.has_mode(destination, EnumPublishMode::Archive) {
        l_actions.push(SpecAction::archive_auto_named(
            EnumActionKind::ArchiveDirectory,
            destination.path_target.as_str(),
        ));
    }
    if rule.has_mode(destination, EnumPublishMode::SubOnly) {
        l_actions.extend(generate_actions_for_directory_sub_only(rule, destination, checker));
    } else {
        l_actions.extend(generate_actions_for_directory_full(rule, destination, checker));
    }
}

/// Recreate the contents of the source directory directly under the destination.
pub fn generate_actions_for_directory_sub_only(
    rule: &SpecPublishRule,
    destination: &SpecDestination,
    checker: &dyn AccessChecker,
) -> Vec<SpecAction> {
    let path_dir_src = Path::new(&rule.path_source);
    if !path_dir_src.is_dir()
        || !checker.has_access(path_dir_src, EnumEntryKind::Directory, EnumAccessRight::Read)
    {
        debug!(
            source = %rule.path_source,
            "source directory missing or unreadable; nothing planned"
        );
        return Vec::new();
    }
    walk_source_tree(rule, destination, &destination.path_target)
}

/// Recreate the source directory itself, by its base name, under the destination.
pub fn generate_actions_for_directory_full(
    rule: &SpecPublishRule,
    destination: &SpecDestination,
    checker: &dyn AccessChecker,
) -> Vec<SpecAction> {
    let path_dir_src = Path::new(&rule.path_source);
    let b_parent_exists =
        derive_parent_dir(&rule.path_source).is_some_and(|c_parent| Path::new(&c_parent).is_dir());
    let Some(c_base_name) = derive_base_name(&rule.path_source) else {
        debug!(source = %rule.path_source, "source directory has no base name; nothing planned");
        return Vec::new();
    };
    if !path_dir_src.is_dir()
        || !b_parent_exists
        || !checker.has_access(path_dir_src, EnumEntryKind::Directory, EnumAccessRight::Read)
    {
        debug!(
            source = %rule.path_source,
            "source directory or its parent missing or unreadable; nothing planned"
        );
        return Vec::new();
    }

    let c_target_base = combine_path(&destination.path_target, &[&c_base_name]);
    let mut l_actions = vec![SpecAction::create_directory(append_dir_separator(&c_target_base))];
    l_actions.extend(walk_source_tree(rule, destination, &c_target_base));
    l_actions
}

fn walk_source_tree(
    rule: &SpecPublishRule,
    destination: &SpecDestination,
    c_target_root: &str,
) -> Vec<SpecAction> {
    let kind_copy = select_kind(
        rule.has_mode(destination, EnumPublishMode::Overwrite),
        EnumActionKind::CopyFileToFile,
        EnumActionKind::CopyFileToFileOverwrite,
    );

    let mut l_actions = Vec::new();
    for entry_res in WalkDir::new(&rule.path_source).min_depth(1).sort_by_file_name() {
        let entry = match entry_res {
            Ok(v) => v,
            Err(e) => {
                debug!(source = %rule.path_source, error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let c_entry = entry.path().to_string_lossy();
        let c_relative = strip_path_prefix(&c_entry, &rule.path_source);
        let c_target = combine_path(c_target_root, &[c_relative]);

        if entry.file_type().is_dir() {
            l_actions.push(SpecAction::create_directory(append_dir_separator(&c_target)));
        } else if entry.file_type().is_file() {
            l_actions.push(SpecAction::with_source_target(
                kind_copy,
                c_entry.to_string(),
                c_target,
            ));
        }
    }
    l_actions
}

fn plan_directory_to_archive(
    rule: &SpecPublishRule,
    destination: &SpecDestination,
    l_actions: &mut Vec<SpecAction>,
) {
    let kind = select_kind(
        rule.has_mode(destination, EnumPublishMode::Overwrite),
        EnumActionKind::ArchiveDirectory,
        EnumActionKind::ArchiveDirectoryOverwrite,
    );
    l_actions.push(SpecAction::with_source_target(
        kind,
        rule.path_source.as_str(),
        destination.path_target.as_str(),
    ));
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
