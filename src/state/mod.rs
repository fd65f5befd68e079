//! View state for the admin console.
//!
//! Each list view owns its own pagination, selection and filter state; none of
//! it is shared between views.
//!
//! # Architecture
//!
//! ```text
//! App
//! ├── DashboardState   - Order breakdown and entity counts
//! ├── LoginState       - Session token input
//! └── ListViewState    - One per entity, created on first visit
//!     ├── PaginationState
//!     ├── SelectionState
//!     └── FilterState
//! ```

mod dashboard;
mod filters;
mod list_view;
mod login;
pub mod pagination;
mod selection;

pub use dashboard::{DashboardState, ORDER_SAMPLE_SIZE};
pub use filters::{DateRange, FilterState, Filters};
pub use list_view::{ListViewState, PAGE_SIZES};
pub use login::LoginState;
pub use pagination::{PaginationState, DEFAULT_PAGE_SIZE};
pub use selection::SelectionState;
