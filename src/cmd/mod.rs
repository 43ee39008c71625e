//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module    | Commands handled |
//! |-----------|------------------|
//! | `run`     | `Run`            |
//! | `plan`    | `Plan`, `Status` |
//! | `reports` | `Reports`        |

pub mod plan;
pub mod reports;
pub mod run;

pub use plan::{cmd_plan, cmd_status};
pub use reports::cmd_reports;
pub use run::cmd_run;
