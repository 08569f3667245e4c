//! Publication rule models, planned actions, outcomes and error types.

use std::collections::BTreeSet;
use std::fmt;
use std::io;
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Kind of a publication source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EnumSourceKind {
    /// A single file.
    File,
    /// A directory tree.
    Directory,
}

/// Kind of a publication destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EnumTargetKind {
    /// Destination path names the target file itself.
    File,
    /// Destination path names a directory that receives the source.
    Directory,
    /// Destination path names a zip archive.
    Archive,
}

/// Behavior flags of a rule or destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EnumPublishMode {
    /// Replace existing target files.
    Overwrite,
    /// Zip pre-existing destination content before it is replaced.
    Archive,
    /// Publish only the contents of a source directory, not the directory itself.
    SubOnly,
}

/// Planned operation kind.
///
/// Declaration order is the execution order used by [`crate::order::order_actions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EnumActionKind {
    ArchiveDirectory,
    ArchiveDirectoryOverwrite,
    ArchiveFile,
    ArchiveFileOverwrite,
    CreateDirectory,
    CopyFileToDirectory,
    CopyFileToDirectoryOverwrite,
    CopyFileToFile,
    CopyFileToFileOverwrite,
}

impl EnumActionKind {
    /// Every kind, in execution order.
    pub const ALL: [EnumActionKind; 9] = [
        Self::ArchiveDirectory,
        Self::ArchiveDirectoryOverwrite,
        Self::ArchiveFile,
        Self::ArchiveFileOverwrite,
        Self::CreateDirectory,
        Self::CopyFileToDirectory,
        Self::CopyFileToDirectoryOverwrite,
        Self::CopyFileToFile,
        Self::CopyFileToFileOverwrite,
    ];

    /// Human-readable label used in reports.
    pub fn description(self) -> &'static str {
        match self {
            Self::ArchiveDirectory | Self::ArchiveDirectoryOverwrite => "Archive Folder",
            Self::ArchiveFile | Self::ArchiveFileOverwrite => "Archive File",
            Self::CreateDirectory => "Create Folder",
            Self::CopyFileToDirectory => "Copy File to Folder",
            Self::CopyFileToDirectoryOverwrite => "Copy File to Folder Overwrite",
            Self::CopyFileToFile => "Copy File to File",
            Self::CopyFileToFileOverwrite => "Copy File to File Overwrite",
        }
    }

    /// Whether this kind replaces an existing target.
    pub fn if_overwrite(self) -> bool {
        matches!(
            self,
            Self::ArchiveDirectoryOverwrite
                | Self::ArchiveFileOverwrite
                | Self::CopyFileToDirectoryOverwrite
                | Self::CopyFileToFileOverwrite
        )
    }
}

/// Outcome category of one executed action, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EnumActionResultType {
    Successful,
    WithWarnings,
    Failed,
}

impl EnumActionResultType {
    /// Human-readable label used in reports.
    pub fn description(self) -> &'static str {
        match self {
            Self::Successful => "Action Successful",
            Self::WithWarnings => "Action Successful With Warnings",
            Self::Failed => "Action Failed",
        }
    }
}

impl fmt::Display for EnumActionResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Successful => "Successful",
            Self::WithWarnings => "WithWarnings",
            Self::Failed => "Failed",
        };
        f.write_str(label)
    }
}

/// Filesystem entry kind passed to access checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumEntryKind {
    File,
    Directory,
}

/// Access right requested from an [`crate::access::AccessChecker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumAccessRight {
    Read,
    Write,
}

impl EnumAccessRight {
    /// Bit used in [`crate::access::SpecAccessRule::rights_mask`].
    pub fn mask(self) -> u8 {
        match self {
            Self::Read => 0b01,
            Self::Write => 0b10,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RuleModel

/// One destination of a publication rule.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpecDestination {
    /// Target path (file, directory or archive path depending on `target_kind`).
    pub path_target: String,
    /// Destination type.
    pub target_kind: EnumTargetKind,
    /// Destination-level behavior flags.
    #[cfg_attr(feature = "serde", serde(default))]
    pub modes: BTreeSet<EnumPublishMode>,
}

impl SpecDestination {
    pub fn new(path_target: impl Into<String>, target_kind: EnumTargetKind) -> Self {
        Self {
            path_target: path_target.into(),
            target_kind,
            modes: BTreeSet::new(),
        }
    }

    /// Add behavior flags.
    pub fn with_modes(mut self, modes: impl IntoIterator<Item = EnumPublishMode>) -> Self {
        self.modes.extend(modes);
        self
    }
}

/// One declarative source-to-destinations mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpecPublishRule {
    /// Display name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    /// Source file or directory path.
    pub path_source: String,
    /// Source type; selects the planning branch.
    pub source_kind: EnumSourceKind,
    /// Rule-level behavior flags, unioned with each destination's flags.
    #[cfg_attr(feature = "serde", serde(default))]
    pub modes: BTreeSet<EnumPublishMode>,
    /// Destinations in declaration order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub destinations: Vec<SpecDestination>,
}

impl SpecPublishRule {
    pub fn new(
        name: impl Into<String>,
        path_source: impl Into<String>,
        source_kind: EnumSourceKind,
    ) -> Self {
        Self {
            name: name.into(),
            path_source: path_source.into(),
            source_kind,
            modes: BTreeSet::new(),
            destinations: Vec::new(),
        }
    }

    /// Add rule-level behavior flags.
    pub fn with_modes(mut self, modes: impl IntoIterator<Item = EnumPublishMode>) -> Self {
        self.modes.extend(modes);
        self
    }

    /// Append a destination.
    pub fn with_destination(mut self, destination: SpecDestination) -> Self {
        self.destinations.push(destination);
        self
    }

    /// Whether `mode` is set on the rule or on `destination`.
    pub fn has_mode(&self, destination: &SpecDestination, mode: EnumPublishMode) -> bool {
        self.modes.contains(&mode) || destination.modes.contains(&mode)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ActionsAndResults

/// One planned filesystem operation.
///
/// Two actions are equal when kind, source and target all match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpecAction {
    pub kind: EnumActionKind,
    /// `None` for directory creation.
    pub path_source: Option<String>,
    /// `None` lets archive actions synthesize a timestamped name.
    pub path_target: Option<String>,
}

impl SpecAction {
    pub fn new(
        kind: EnumActionKind,
        path_source: Option<String>,
        path_target: Option<String>,
    ) -> Self {
        Self {
            kind,
            path_source,
            path_target,
        }
    }

    pub fn create_directory(path_target: impl Into<String>) -> Self {
        Self::new(EnumActionKind::CreateDirectory, None, Some(path_target.into()))
    }

    pub fn with_source_target(
        kind: EnumActionKind,
        path_source: impl Into<String>,
        path_target: impl Into<String>,
    ) -> Self {
        Self::new(kind, Some(path_source.into()), Some(path_target.into()))
    }

    /// Archive action whose archive path is derived at execution time.
    pub fn archive_auto_named(kind: EnumActionKind, path_source: impl Into<String>) -> Self {
        Self::new(kind, Some(path_source.into()), None)
    }
}

/// Immutable outcome of one executed action.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpecActionResult {
    pub result_type: EnumActionResultType,
    pub message: Option<String>,
}

impl SpecActionResult {
    pub fn successful(message: impl Into<String>) -> Self {
        Self {
            result_type: EnumActionResultType::Successful,
            message: Some(message.into()),
        }
    }

    pub fn with_warnings(message: impl Into<String>) -> Self {
        Self {
            result_type: EnumActionResultType::WithWarnings,
            message: Some(message.into()),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            result_type: EnumActionResultType::Failed,
            message: Some(message.into()),
        }
    }

    pub fn is_successful(&self) -> bool {
        self.result_type == EnumActionResultType::Successful
    }

    pub fn is_failed(&self) -> bool {
        self.result_type == EnumActionResultType::Failed
    }
}

/// A planned action joined with its result by execution position.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpecActionOutcome {
    /// 1-based execution position.
    pub n_index: usize,
    pub action: SpecAction,
    pub result: SpecActionResult,
}

impl fmt::Display for SpecActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{};{};{};{}",
            self.action.kind.description(),
            self.action.path_source.as_deref().unwrap_or_default(),
            self.action.path_target.as_deref().unwrap_or_default(),
            self.result.result_type
        )?;
        if let Some(message) = &self.result.message {
            write!(f, ";{message}")?;
        }
        Ok(())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region OptionsAndErrors

/// Run-time options for action execution.
#[derive(Debug, Clone)]
pub struct SpecPublishOptions {
    /// Evaluate preconditions only; never mutate the filesystem.
    ///
    /// Each action is checked against the filesystem as it currently is. A
    /// directory that a dry-run `CreateDirectory` reports as creatable still
    /// does not exist for later actions, so copies into it report `Failed`
    /// ("Target directory ... does not exist").
    pub if_dry_run: bool,
    /// Carry permissions, timestamps and xattrs over to copied files.
    pub if_preserve_metadata: bool,
    /// Deflate level for produced archives (`Some(1)` is fastest).
    pub n_compression_level: Option<i64>,
}

impl Default for SpecPublishOptions {
    fn default() -> Self {
        Self {
            if_dry_run: false,
            if_preserve_metadata: true,
            n_compression_level: Some(1),
        }
    }
}

/// Errors raised by internal filesystem helpers.
///
/// Primitives in [`crate::ops`] convert these into failed [`SpecActionResult`]s.
#[derive(Debug, thiserror::Error)]
pub enum PublishIoError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Invalid path: {}", .0.display())]
    InvalidPath(PathBuf),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
