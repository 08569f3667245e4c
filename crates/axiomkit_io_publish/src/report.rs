//! Publish run report and its builder.

use std::collections::BTreeMap;
use std::fmt;

use crate::spec::{EnumActionResultType, SpecAction, SpecActionOutcome, SpecActionResult};

/// Ordered outcomes of one publish run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportPublish {
    /// One entry per executed action, in execution order.
    pub outcomes: Vec<SpecActionOutcome>,
}

impl ReportPublish {
    /// Number of executed actions.
    pub fn action_count(&self) -> usize {
        self.outcomes.len()
    }

    /// True iff at least one action ran and none failed.
    ///
    /// An empty run is not considered successful.
    pub fn is_all_successful(&self) -> bool {
        !self.outcomes.is_empty() && !self.has_failures()
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|outcome| outcome.result.is_failed())
    }

    pub fn count_by_type(&self, result_type: EnumActionResultType) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.result.result_type == result_type)
            .count()
    }

    /// Messages of every outcome in the given category, in execution order.
    pub fn messages_by_type(&self, result_type: EnumActionResultType) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.result.result_type == result_type)
            .filter_map(|outcome| outcome.result.message.clone())
            .collect()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_actions".to_string(), self.action_count() as u64);
        dict_counts.insert(
            "cnt_successful".to_string(),
            self.count_by_type(EnumActionResultType::Successful) as u64,
        );
        dict_counts.insert(
            "cnt_warnings".to_string(),
            self.count_by_type(EnumActionResultType::WithWarnings) as u64,
        );
        dict_counts.insert(
            "cnt_failed".to_string(),
            self.count_by_type(EnumActionResultType::Failed) as u64,
        );
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let dict_counts = self.to_dict();
        format!(
            "{prefix} actions={} successful={} warnings={} failed={}",
            dict_counts["cnt_actions"],
            dict_counts["cnt_successful"],
            dict_counts["cnt_warnings"],
            dict_counts["cnt_failed"]
        )
    }
}

impl fmt::Display for ReportPublish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[PUBLISH]"))
    }
}

/// Mutable accumulator of action outcomes.
#[derive(Debug, Default, Clone)]
pub struct ReportPublishBuilder {
    /// See [`ReportPublish::outcomes`].
    pub outcomes: Vec<SpecActionOutcome>,
}

impl ReportPublishBuilder {
    /// Record the result of the next executed action and return the stored outcome.
    pub fn add_outcome(
        &mut self,
        action: SpecAction,
        result: SpecActionResult,
    ) -> &SpecActionOutcome {
        let n_index = self.outcomes.len() + 1;
        self.outcomes.push(SpecActionOutcome {
            n_index,
            action,
            result,
        });
        &self.outcomes[n_index - 1]
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportPublish {
        ReportPublish {
            outcomes: self.outcomes,
        }
    }
}
