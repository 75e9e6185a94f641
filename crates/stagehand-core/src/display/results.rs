//! Display implementation for the report of a whole run.

use std::fmt;

use super::datetime::{Elapsed, LocalDateTime};
use crate::models::RunReport;

impl RunReport {
    fn status_icon(&self) -> &'static str {
        if self.success() {
            "✓ Succeeded"
        } else {
            "✗ Failed"
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Deployment run ({})", self.status_icon())?;
        writeln!(f)?;
        writeln!(f, "- Started: {}", LocalDateTime(&self.started_at))?;
        writeln!(f, "- Finished: {}", LocalDateTime(&self.finished_at))?;
        writeln!(
            f,
            "- Took: {}",
            Elapsed {
                from: &self.started_at,
                to: &self.finished_at,
            }
        )?;
        writeln!(
            f,
            "- Steps: {} succeeded, {} failed, {} skipped",
            self.succeeded_count(),
            self.failed_count(),
            self.skipped_count()
        )?;

        if self.results.is_empty() {
            return writeln!(f, "\nNo steps were run.");
        }

        writeln!(f, "\n## Steps")?;
        writeln!(f)?;
        for result in &self.results {
            write!(f, "{result}")?;
        }
        Ok(())
    }
}
