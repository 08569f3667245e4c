//! `axiomkit_io_publish` v1:
//! Rule-driven content publishing engine.
//!
//! Publication rules are planned into filesystem actions, ordered by action
//! kind, then executed one at a time with per-action outcomes:
//! - `spec`    : enums/rule model/actions/options/errors
//! - `access`  : read/write access checks
//! - `plan`    : rule expansion into actions
//! - `order`   : execution ordering and de-duplication
//! - `ops`     : filesystem primitives with precondition checks
//! - `publish` : action execution and the `Publisher` run flow
//! - `report`  : run-time report model
//! - `util`    : shared helper functions

pub mod access;
pub mod ops;
pub mod order;
pub mod plan;
pub mod publish;
pub mod report;
pub mod spec;
mod util;

pub use access::{
    AccessChecker, AccessRuleSource, EnumAccessRuleType, EnumPrincipal, FsAccessChecker,
    MetadataAccessRuleSource, RuleAccessChecker, SpecAccessRule, SpecIdentity,
    StaticAccessRuleSource, default_access_checker, evaluate_access_rules,
};
pub use order::order_actions;
pub use plan::generate_plan;
pub use publish::{Publisher, execute_action, execute_actions};
pub use report::{ReportPublish, ReportPublishBuilder};
pub use spec::{
    EnumAccessRight, EnumActionKind, EnumActionResultType, EnumEntryKind, EnumPublishMode,
    EnumSourceKind, EnumTargetKind, PublishIoError, SpecAction, SpecActionOutcome,
    SpecActionResult, SpecDestination, SpecPublishOptions, SpecPublishRule,
};
