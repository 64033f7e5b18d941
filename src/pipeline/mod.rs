//! Processing pipeline: annotation runs, reconciliation and coverage.

mod aggregator;
mod coverage;
mod reconcile;

pub use aggregator::{MonthlyAggregator, RunSummary, partition_by_month};
pub use coverage::uncovered_folders;
pub use reconcile::{
    JoinStats, MergeAllSummary, merge_all, merge_month, month_from_file, outer_join,
};
