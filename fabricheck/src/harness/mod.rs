//! Fixture scoping, sequential execution and reporting.

mod fixture;
mod report;
mod runner;

pub use fixture::FixtureScope;
pub use report::{CheckResult, Outcome, Report};
pub use runner::Runner;
