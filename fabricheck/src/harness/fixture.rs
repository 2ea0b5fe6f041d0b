//! Group-scoped device fixtures.
//!
//! A [`FixtureScope`] lives for one check group. The first check that asks
//! for a role connects to it; later checks reuse the same probe. A role that
//! could not be connected stays unavailable for the rest of the group and is
//! never retried. [`FixtureScope::teardown`] disconnects everything that was
//! set up, newest first.

use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, info};

use crate::driver::{ConnectionProfile, Connector};
use crate::inventory::Inventory;
use crate::probe::FabricProbe;
use crate::session::DeviceSession;

enum Fixture<C: Connector> {
    Ready(FabricProbe<C>),
    Unavailable(String),
}

/// Fixtures shared by the checks of one group.
pub struct FixtureScope<'a, C: Connector> {
    connector: Arc<C>,
    inventory: &'a Inventory,
    profile: &'a ConnectionProfile,
    fixtures: IndexMap<String, Fixture<C>>,
}

impl<'a, C: Connector> FixtureScope<'a, C> {
    pub fn new(connector: Arc<C>, inventory: &'a Inventory, profile: &'a ConnectionProfile) -> Self {
        Self {
            connector,
            inventory,
            profile,
            fixtures: IndexMap::new(),
        }
    }

    /// Set up the fixture for `role` if this scope has not tried yet.
    ///
    /// Returns the skip reason when the role is unknown or cannot be reached.
    pub async fn setup(&mut self, role: &str) -> Result<(), String> {
        if let Some(fixture) = self.fixtures.get(role) {
            return match fixture {
                Fixture::Ready(_) => Ok(()),
                Fixture::Unavailable(reason) => Err(reason.clone()),
            };
        }

        let Some(identity) = self.inventory.get(role) else {
            return Err(format!("Unknown device role '{role}'"));
        };

        debug!("Setting up fixture {role}");
        let mut session = DeviceSession::new(identity.clone(), self.profile.clone(), self.connector.clone());
        let (fixture, result) = match session.connect().await {
            Ok(()) => (Fixture::Ready(FabricProbe::new(session)), Ok(())),
            Err(fault) => {
                let reason = fault.to_string();
                (Fixture::Unavailable(reason.clone()), Err(reason))
            }
        };
        self.fixtures.insert(role.to_string(), fixture);
        result
    }

    /// Set up every role before any of them is used.
    pub async fn resolve(&mut self, roles: &[&str]) -> Result<(), String> {
        for role in roles {
            self.setup(role).await?;
        }
        Ok(())
    }

    /// Probe for a role that has been set up successfully.
    pub fn probe(&mut self, role: &str) -> Option<&mut FabricProbe<C>> {
        match self.fixtures.get_mut(role) {
            Some(Fixture::Ready(probe)) => Some(probe),
            _ => None,
        }
    }

    /// Number of roles this scope has tried to set up.
    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }

    /// Disconnect every ready fixture in reverse setup order.
    pub async fn teardown(&mut self) {
        for (role, fixture) in self.fixtures.drain(..).rev() {
            if let Fixture::Ready(mut probe) = fixture {
                info!("Tearing down fixture {role}");
                probe.disconnect().await;
            }
        }
    }
}
