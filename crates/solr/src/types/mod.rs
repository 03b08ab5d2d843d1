//! Engine-neutral inputs and outputs of the adapter.

mod delete;
mod page;
mod patch;
mod query;

pub use delete::DeleteTarget;
pub use page::{FindPage, FindResult};
pub use patch::{FieldPatch, PatchOperation, PatchSpec};
pub use query::{
    Comparison, Condition, FieldConstraint, Filter, GenericQuery, Modifier, QueryEntry,
    SortDirection, SortDirective, SuggestTerm,
};
