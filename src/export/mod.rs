// ABOUTME: Column reconciliation and COPY TEXT export module
// ABOUTME: Handles column discovery, filtered/full exports, and load script assembly

pub mod assemble;
pub mod auxiliary;
pub mod columns;
pub mod primary;
pub mod reconcile;
pub mod report;
pub mod statements;

pub use assemble::assemble_script;
pub use auxiliary::{export_auxiliary_tables, export_table};
pub use columns::discover_columns;
pub use primary::{export_primary, write_import_header};
pub use reconcile::{reconcile, ColumnReconciliation};
pub use report::{ExportOutcome, ExportReport};
