//! Sequential suite runner.

use std::sync::Arc;
use std::time::Instant;

use log::{info, warn};

use super::{CheckResult, FixtureScope, Outcome, Report};
use crate::checks::{CheckGroup, Suite};
use crate::driver::{ConnectionProfile, Connector};
use crate::inventory::Inventory;

/// Runs suites group by group, one check at a time.
pub struct Runner<C: Connector> {
    connector: Arc<C>,
    inventory: Inventory,
    profile: ConnectionProfile,
}

impl<C: Connector> Runner<C> {
    pub fn new(connector: C, inventory: Inventory, profile: ConnectionProfile) -> Self {
        Self {
            connector: Arc::new(connector),
            inventory,
            profile,
        }
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Run every group of the suite.
    pub async fn run(&self, suite: &Suite) -> Report {
        let mut report = Report::new();
        for group in &suite.groups {
            self.run_group(group, &mut report).await;
        }
        info!(
            "{} passed, {} failed, {} skipped",
            report.passed(),
            report.failed(),
            report.skipped()
        );
        report
    }

    /// Run one group in its own fixture scope, then tear the scope down.
    pub async fn run_group(&self, group: &CheckGroup, report: &mut Report) {
        info!("Running group {} ({} checks)", group.name, group.checks.len());
        let mut scope = FixtureScope::new(self.connector.clone(), &self.inventory, &self.profile);

        for check in &group.checks {
            let start = Instant::now();
            let outcome = check.run(&mut scope).await;
            match &outcome {
                Outcome::Passed => info!("{}::{} passed", group.name, check.name),
                Outcome::Failed { message } => warn!("{}::{} failed: {}", group.name, check.name, message),
                Outcome::Skipped { reason } => warn!("{}::{} skipped: {}", group.name, check.name, reason),
            }
            report.push(CheckResult {
                group: group.name.clone(),
                name: check.name.clone(),
                outcome,
                elapsed: start.elapsed(),
            });
        }

        scope.teardown().await;
    }
}
