//! Read/write access checks for the acting identity.
//!
//! A check gathers access-control entries for a path and combines them:
//! an explicit deny wins immediately, an explicit allow wins next, and
//! among inherited entries a deny outweighs an allow.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::spec::{EnumAccessRight, EnumEntryKind, PublishIoError};

////////////////////////////////////////////////////////////////////////////////
// #region AccessModel

/// Identity or group an access rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumPrincipal {
    User(u32),
    Group(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumAccessRuleType {
    Allow,
    Deny,
}

/// One access-control entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAccessRule {
    pub principal: EnumPrincipal,
    pub rule_type: EnumAccessRuleType,
    /// Bitwise OR of [`EnumAccessRight::mask`] values.
    pub rights_mask: u8,
    /// Inherited from a parent container rather than set on the entry itself.
    pub if_inherited: bool,
}

impl SpecAccessRule {
    pub fn allow(principal: EnumPrincipal, rights: &[EnumAccessRight]) -> Self {
        Self {
            principal,
            rule_type: EnumAccessRuleType::Allow,
            rights_mask: _fold_mask(rights),
            if_inherited: false,
        }
    }

    pub fn deny(principal: EnumPrincipal, rights: &[EnumAccessRight]) -> Self {
        Self {
            principal,
            rule_type: EnumAccessRuleType::Deny,
            rights_mask: _fold_mask(rights),
            if_inherited: false,
        }
    }

    /// Mark this entry as inherited.
    pub fn inherited(mut self) -> Self {
        self.if_inherited = true;
        self
    }

    fn covers(&self, right: EnumAccessRight) -> bool {
        self.rights_mask & right.mask() == right.mask()
    }
}

fn _fold_mask(rights: &[EnumAccessRight]) -> u8 {
    rights.iter().fold(0, |acc, right| acc | right.mask())
}

/// The acting identity: a user plus the groups it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecIdentity {
    pub uid: u32,
    pub l_gids: Vec<u32>,
}

impl SpecIdentity {
    pub fn new(uid: u32, l_gids: Vec<u32>) -> Self {
        Self { uid, l_gids }
    }

    /// Effective identity of the running process.
    #[cfg(unix)]
    pub fn current() -> Self {
        use nix::unistd::{getegid, geteuid};

        let mut l_gids = vec![getegid().as_raw()];
        #[cfg(target_os = "linux")]
        if let Ok(l_groups) = nix::unistd::getgroups() {
            for gid in l_groups {
                if !l_gids.contains(&gid.as_raw()) {
                    l_gids.push(gid.as_raw());
                }
            }
        }
        Self::new(geteuid().as_raw(), l_gids)
    }

    #[cfg(not(unix))]
    pub fn current() -> Self {
        Self::new(0, Vec::new())
    }

    pub fn matches(&self, principal: EnumPrincipal) -> bool {
        match principal {
            EnumPrincipal::User(uid) => uid == self.uid,
            EnumPrincipal::Group(gid) => self.l_gids.contains(&gid),
        }
    }
}

/// Combine `rules` for `identity` and decide whether `right` is granted.
pub fn evaluate_access_rules(
    identity: &SpecIdentity,
    rules: &[SpecAccessRule],
    right: EnumAccessRight,
) -> bool {
    let mut b_allow = false;
    let mut b_inherited_allow = false;
    let mut b_inherited_deny = false;

    for rule in rules {
        if !identity.matches(rule.principal) || !rule.covers(right) {
            continue;
        }
        match (rule.rule_type, rule.if_inherited) {
            (EnumAccessRuleType::Deny, false) => return false,
            (EnumAccessRuleType::Deny, true) => b_inherited_deny = true,
            (EnumAccessRuleType::Allow, false) => b_allow = true,
            (EnumAccessRuleType::Allow, true) => b_inherited_allow = true,
        }
    }

    b_allow || (b_inherited_allow && !b_inherited_deny)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Checkers

/// Capability answering "may the acting identity read/write this path?".
pub trait AccessChecker {
    fn has_access(&self, path: &Path, entry_kind: EnumEntryKind, right: EnumAccessRight) -> bool;
}

/// Supplier of access-control entries for a path.
pub trait AccessRuleSource {
    fn list_access_rules(
        &self,
        path: &Path,
        entry_kind: EnumEntryKind,
        identity: &SpecIdentity,
    ) -> Result<Vec<SpecAccessRule>, PublishIoError>;
}

/// [`AccessChecker`] evaluating the entries of an [`AccessRuleSource`].
///
/// The identity is captured once at construction and reused for every check.
#[derive(Debug, Clone)]
pub struct RuleAccessChecker<S> {
    identity: SpecIdentity,
    source: S,
}

impl<S: AccessRuleSource> RuleAccessChecker<S> {
    pub fn new(identity: SpecIdentity, source: S) -> Self {
        Self { identity, source }
    }

    pub fn for_current_identity(source: S) -> Self {
        Self::new(SpecIdentity::current(), source)
    }

    pub fn identity(&self) -> &SpecIdentity {
        &self.identity
    }
}

impl<S: AccessRuleSource> AccessChecker for RuleAccessChecker<S> {
    fn has_access(&self, path: &Path, entry_kind: EnumEntryKind, right: EnumAccessRight) -> bool {
        match self.source.list_access_rules(path, entry_kind, &self.identity) {
            Ok(l_rules) => evaluate_access_rules(&self.identity, &l_rules, right),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "access rule lookup failed");
                false
            }
        }
    }
}

/// Checker backed by filesystem metadata for the running process.
pub type FsAccessChecker = RuleAccessChecker<MetadataAccessRuleSource>;

pub fn default_access_checker() -> FsAccessChecker {
    RuleAccessChecker::for_current_identity(MetadataAccessRuleSource)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RuleSources

/// Derives explicit entries from filesystem permission metadata.
///
/// On Unix the owner/group/other class that applies to the identity yields an
/// allow for the bits present and a deny for the bits absent. uid 0 is allowed
/// everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataAccessRuleSource;

impl AccessRuleSource for MetadataAccessRuleSource {
    #[cfg(unix)]
    fn list_access_rules(
        &self,
        path: &Path,
        _entry_kind: EnumEntryKind,
        identity: &SpecIdentity,
    ) -> Result<Vec<SpecAccessRule>, PublishIoError> {
        use std::os::unix::fs::MetadataExt;

        let stat_path = std::fs::metadata(path)?;
        let principal_self = EnumPrincipal::User(identity.uid);
        if identity.uid == 0 {
            return Ok(vec![SpecAccessRule::allow(
                principal_self,
                &[EnumAccessRight::Read, EnumAccessRight::Write],
            )]);
        }

        let n_mode = stat_path.mode();
        let (principal, n_shift) = if stat_path.uid() == identity.uid {
            (EnumPrincipal::User(stat_path.uid()), 6)
        } else if identity.l_gids.contains(&stat_path.gid()) {
            (EnumPrincipal::Group(stat_path.gid()), 3)
        } else {
            (principal_self, 0)
        };

        let mut l_allowed = Vec::new();
        let mut l_denied = Vec::new();
        for (right, n_bit) in [(EnumAccessRight::Read, 0o4), (EnumAccessRight::Write, 0o2)] {
            if (n_mode >> n_shift) & n_bit != 0 {
                l_allowed.push(right);
            } else {
                l_denied.push(right);
            }
        }

        let mut l_rules = Vec::with_capacity(2);
        if !l_denied.is_empty() {
            l_rules.push(SpecAccessRule::deny(principal, &l_denied));
        }
        if !l_allowed.is_empty() {
            l_rules.push(SpecAccessRule::allow(principal, &l_allowed));
        }
        Ok(l_rules)
    }

    #[cfg(not(unix))]
    fn list_access_rules(
        &self,
        path: &Path,
        _entry_kind: EnumEntryKind,
        identity: &SpecIdentity,
    ) -> Result<Vec<SpecAccessRule>, PublishIoError> {
        let stat_path = std::fs::metadata(path)?;
        let principal_self = EnumPrincipal::User(identity.uid);
        let mut l_rules = vec![SpecAccessRule::allow(principal_self, &[EnumAccessRight::Read])];
        if stat_path.permissions().readonly() {
            l_rules.push(SpecAccessRule::deny(principal_self, &[EnumAccessRight::Write]));
        } else {
            l_rules.push(SpecAccessRule::allow(principal_self, &[EnumAccessRight::Write]));
        }
        Ok(l_rules)
    }
}

/// In-memory entries keyed by path, with optional fallback entries.
#[derive(Debug, Clone, Default)]
pub struct StaticAccessRuleSource {
    dict_rules: BTreeMap<PathBuf, Vec<SpecAccessRule>>,
    l_rules_default: Vec<SpecAccessRule>,
}

impl StaticAccessRuleSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries returned for `path` (exact, component-wise match).
    pub fn with_rules(mut self, path: impl Into<PathBuf>, rules: Vec<SpecAccessRule>) -> Self {
        self.dict_rules.entry(path.into()).or_default().extend(rules);
        self
    }

    /// Entries returned for paths without their own entries.
    pub fn with_default_rules(mut self, rules: Vec<SpecAccessRule>) -> Self {
        self.l_rules_default = rules;
        self
    }
}

impl AccessRuleSource for StaticAccessRuleSource {
    fn list_access_rules(
        &self,
        path: &Path,
        _entry_kind: EnumEntryKind,
        _identity: &SpecIdentity,
    ) -> Result<Vec<SpecAccessRule>, PublishIoError> {
        Ok(self
            .dict_rules
            .get(path)
            .unwrap_or(&self.l_rules_default)
            .clone())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
pub(crate) fn checker_allow_all() -> RuleAccessChecker<StaticAccessRuleSource> {
    checker_with_source(StaticAccessRuleSource::new())
}

/// Checker for uid 1000 whose unmatched paths fall back to read/write allow.
#[cfg(test)]
pub(crate) fn checker_with_source(
    source: StaticAccessRuleSource,
) -> RuleAccessChecker<StaticAccessRuleSource> {
    let principal = EnumPrincipal::User(1000);
    RuleAccessChecker::new(
        SpecIdentity::new(1000, Vec::new()),
        source.with_default_rules(vec![SpecAccessRule::allow(
            principal,
            &[EnumAccessRight::Read, EnumAccessRight::Write],
        )]),
    )
}
