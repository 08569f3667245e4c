//! Action execution and the plan → order → execute run flow.

use tracing::{debug, error, info, warn};

use crate::access::AccessChecker;
use crate::ops::{
    archive_directory, archive_file, copy_file_to_directory, copy_file_to_file, create_directory,
};
use crate::order::order_actions;
use crate::plan::generate_plan;
use crate::report::{ReportPublish, ReportPublishBuilder};
use crate::spec::{
    EnumActionKind, EnumActionResultType, SpecAction, SpecActionOutcome, SpecActionResult,
    SpecPublishOptions, SpecPublishRule,
};

/// Dispatch one action to its filesystem primitive.
pub fn execute_action(
    action: &SpecAction,
    checker: &dyn AccessChecker,
    options: &SpecPublishOptions,
) -> SpecActionResult {
    let c_source = action.path_source.as_deref().unwrap_or_default();
    let c_target = action.path_target.as_deref();
    let if_overwrite = action.kind.if_overwrite();

    match action.kind {
        EnumActionKind::CreateDirectory => {
            create_directory(c_target.unwrap_or_default(), checker, options)
        }
        EnumActionKind::CopyFileToFile | EnumActionKind::CopyFileToFileOverwrite => {
            copy_file_to_file(
                c_source,
                c_target.unwrap_or_default(),
                if_overwrite,
                checker,
                options,
            )
        }
        EnumActionKind::CopyFileToDirectory | EnumActionKind::CopyFileToDirectoryOverwrite => {
            copy_file_to_directory(
                c_source,
                c_target.unwrap_or_default(),
                if_overwrite,
                checker,
                options,
            )
        }
        EnumActionKind::ArchiveFile | EnumActionKind::ArchiveFileOverwrite => {
            archive_file(c_source, c_target, if_overwrite, checker, options)
        }
        EnumActionKind::ArchiveDirectory | EnumActionKind::ArchiveDirectoryOverwrite => {
            archive_directory(c_source, c_target, if_overwrite, checker, options)
        }
    }
}

fn log_outcome(outcome: &SpecActionOutcome, n_total: usize) {
    let c_message = outcome.result.message.as_deref().unwrap_or_default();
    let c_action = outcome.action.kind.description();
    match outcome.result.result_type {
        EnumActionResultType::Successful => {
            info!(n_index = outcome.n_index, n_total, action = c_action, "{c_message}")
        }
        EnumActionResultType::WithWarnings => {
            warn!(n_index = outcome.n_index, n_total, action = c_action, "{c_message}")
        }
        EnumActionResultType::Failed => {
            error!(n_index = outcome.n_index, n_total, action = c_action, "{c_message}")
        }
    }
}

/// Execute `actions` one at a time, in the given order.
///
/// A failed action never stops the run. `on_progress` is called after each
/// action with `(completed, total, outcome)`.
pub fn execute_actions<F>(
    actions: Vec<SpecAction>,
    checker: &dyn AccessChecker,
    options: &SpecPublishOptions,
    mut on_progress: F,
) -> ReportPublish
where
    F: FnMut(usize, usize, &SpecActionOutcome),
{
    let n_total = actions.len();
    let mut builder_report = ReportPublishBuilder::default();
    for action in actions {
        let result = execute_action(&action, checker, options);
        let outcome = builder_report.add_outcome(action, result);
        log_outcome(outcome, n_total);
        on_progress(outcome.n_index, n_total, outcome);
    }
    builder_report.build()
}

/// Plans, orders and executes a set of publication rules.
///
/// ```no_run
/// use axiomkit_io_publish::{
///     EnumPublishMode, EnumSourceKind, EnumTargetKind, Publisher, SpecDestination,
///     SpecPublishOptions, SpecPublishRule, default_access_checker,
/// };
///
/// let rule = SpecPublishRule::new("site", "/srv/build/site", EnumSourceKind::Directory)
///     .with_modes([EnumPublishMode::Overwrite])
///     .with_destination(SpecDestination::new("/var/www", EnumTargetKind::Directory));
/// let publisher =
///     Publisher::new(vec![rule], default_access_checker(), SpecPublishOptions::default());
/// let report = publisher.run(|n_done, n_total, _| eprintln!("{n_done}/{n_total}"));
/// println!("{report}");
/// ```
#[derive(Debug, Clone)]
pub struct Publisher<C> {
    rules: Vec<SpecPublishRule>,
    checker: C,
    options: SpecPublishOptions,
}

impl<C: AccessChecker> Publisher<C> {
    pub fn new(rules: Vec<SpecPublishRule>, checker: C, options: SpecPublishOptions) -> Self {
        Self {
            rules,
            checker,
            options,
        }
    }

    pub fn rules(&self) -> &[SpecPublishRule] {
        &self.rules
    }

    /// Ordered action list the next [`Publisher::run`] would execute.
    pub fn plan(&self) -> Vec<SpecAction> {
        order_actions(generate_plan(&self.rules, &self.checker))
    }

    /// Plan, order and execute every rule.
    ///
    /// The plan is fixed before the first action runs. An empty plan yields an
    /// empty report.
    pub fn run<F>(&self, on_progress: F) -> ReportPublish
    where
        F: FnMut(usize, usize, &SpecActionOutcome),
    {
        if self.rules.is_empty() {
            debug!("no publication rules; nothing to do");
            return ReportPublish::default();
        }
        let l_actions = self.plan();
        if l_actions.is_empty() {
            debug!(n_rules = self.rules.len(), "empty plan; nothing to do");
            return ReportPublish::default();
        }
        execute_actions(l_actions, &self.checker, &self.options, on_progress)
    }
}
