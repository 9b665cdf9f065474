//! Proposal tracker: system enhancement proposals kept in a local SQLite file,
//! with statistics and report export.

pub mod model;
pub mod report;
pub mod store;

pub use model::{Category, Priority, Proposal, ProposalFields, ProposalPatch, Status};
pub use report::{ReportData, ReportFormat, ReportKind};
pub use store::{ListFilter, ProposalStore, Statistics, StoreError};
