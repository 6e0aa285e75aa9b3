//! Loan pipeline
//!
//! Typed access to the `encompass/v1/loanPipeline` collection: one-shot
//! views, random-access cursor creation, and [`LoanPipelineCursor`] for
//! paging through a cursor that already exists.

mod api;
mod types;

pub use api::{
    new_loan_pipeline_cursor, LoanPipeline, LoanPipelineCursor, CURSOR_HEADER,
    LOAN_PIPELINE_PATH, TOTAL_COUNT_HEADER,
};
pub use types::{LoanPipelineData, PipelineParameters, SortCriterion, SortOrder};
