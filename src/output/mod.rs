//! Durable run outputs: token ledger, monthly annotation files and merged
//! tables, plus terminal progress.

mod ledger;
mod merged;
mod monthly;
pub mod progress;

pub use ledger::{LedgerEntry, LedgerTotals, RunLedger};
pub use merged::{MergedTable, write_merged};
pub use monthly::{FolderMetadata, MonthlyEntry, read_monthly, write_monthly};
