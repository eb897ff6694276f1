mod allocator;
mod projector;
mod types;

pub use allocator::{OVER_BUDGET_WARNING, allocate};
pub use projector::{MAX_HORIZON_MONTHS, monthly_savings_from, project};
pub use types::{
    AllocationInput, AllocationResult, PartyShare, Pool, PoolContributions, ProjectionInput,
    ProjectionPoint, ProjectionResult, SplitPolicy,
};
