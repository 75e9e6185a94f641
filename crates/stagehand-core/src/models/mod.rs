//! Data models for steps, outcomes and run results.
//!
//! Display implementations for these models live in
//! [`crate::display::models`], keeping the data structures free of
//! presentation logic.
//!
//! # Examples
//!
//! ```rust
//! use stagehand_core::models::{Readiness, Step, StepAction};
//!
//! let backend = Step::new(
//!     "backend",
//!     StepAction::ApplyManifest {
//!         path: "k8s/backend.yaml".into(),
//!         namespace: None,
//!     },
//! )
//! .depends_on(["database"])
//! .with_readiness(Readiness::pods("app=backend", 120))
//! .idempotent();
//!
//! assert_eq!(backend.depends_on, vec!["database".to_string()]);
//! println!("{}", backend.action); // apply manifest k8s/backend.yaml
//! ```

pub mod result;
pub mod status;
pub mod step;


pub use result::{RunReport, RunResult};
pub use status::{SkipReason, StepOutcome, TeardownScope};
pub use step::{ChartRepo, Readiness, Step, StepAction};
