//! Strategy contracts.

mod row_router;
mod selection_policy;

pub use row_router::RowRouter;
pub use selection_policy::SelectionPolicy;
