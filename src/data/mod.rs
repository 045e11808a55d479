//! Data layer: typed records, loading, filtering and aggregation.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → Table (once per process, see cache)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  FilterSpec predicates → FilteredView (row indices)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ aggregate │  one AggregateRule per chart → AggregateView
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  views    │  render(): every ViewId → DashboardViews
//!   └──────────┘
//! ```

pub mod aggregate;
pub mod cache;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod views;
pub mod writer;

pub use cache::{TableCell, shared_table};
pub use error::LoadError;
pub use filter::{Bounds, FilterSpec, FilteredView, filter};
pub use loader::{InvalidRowPolicy, LoadOptions, load_file};
pub use model::{Record, Table};
pub use views::{DashboardViews, Tab, ViewId, ViewSettings, render};
