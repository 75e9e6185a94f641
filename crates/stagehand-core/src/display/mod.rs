//! Markdown formatting for plans, results and reports.
//!
//! Domain models implement `Display` directly; collections and one-line
//! status messages use small wrapper types. All output is markdown so the
//! command-line front end can render it with styling, or print it as is.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Domain Models  │    │ Display impls & │    │    Markdown     │
//! │ (Step, Report)  │───▶│    Wrappers     │───▶│     Output      │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! ## Wrapper Types
//!
//! - [`PlanRounds`]: a plan grouped into rounds of parallelizable steps
//! - [`OperationStatus`]: `Success:` / `Error:` status lines
//! - [`LocalDateTime`]: timestamps in the system timezone
//! - [`Elapsed`]: the span between two timestamps
//!
//! # Examples
//!
//! ```rust
//! use stagehand_core::display::OperationStatus;
//!
//! let status = OperationStatus::success("teardown:workload completed".to_string());
//! assert_eq!(status.to_string(), "Success: teardown:workload completed\n");
//! ```

pub mod collections;
pub mod datetime;
pub mod models;
pub mod results;
pub mod status;

pub use collections::PlanRounds;
pub use datetime::{Elapsed, LocalDateTime};
pub use status::OperationStatus;
