//! Device inventory: which device plays which role in the fabric.
//!
//! Every role name (`dc1-spine1`, `dc2-leaf1`, ...) maps to exactly one
//! [`DeviceIdentity`]. The built-in [`Inventory::lab`] describes the
//! two-datacenter lab the default suite is written against; a JSON file can
//! replace it.
//!
//! # File format
//!
//! ```json
//! {
//!   "defaults": { "username": "admin", "password": "admin", "platform": "arista_eos" },
//!   "devices": [
//!     { "role": "dc1-spine1", "host": "172.20.20.2", "loopback": "10.0.0.1" },
//!     { "role": "dc2-leaf1", "host": "172.20.20.10", "loopback": "10.0.1.10", "password": "other" }
//!   ]
//! }
//! ```

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::debug;
use secrecy::SecretString;
use serde::Deserialize;

use crate::error::{InventoryError, Result};
use crate::platform::Platform;
use crate::transport::AuthMethod;

const DEFAULT_USERNAME: &str = "admin";

/// Login material for one device.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// SSH username.
    pub username: String,

    /// SSH authentication.
    pub auth: AuthMethod,

    /// Privileged-mode (`enable`) secret.
    pub secret: SecretString,
}

impl Credentials {
    /// Password login; the enable secret is the same password.
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        let password = SecretString::from(password.into());
        Self {
            username: username.into(),
            auth: AuthMethod::Password(password.clone()),
            secret: password,
        }
    }

    /// Key-based login with a separate enable secret.
    pub fn private_key(
        username: impl Into<String>,
        path: impl Into<PathBuf>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            auth: AuthMethod::PrivateKey {
                path: path.into(),
                passphrase: None,
            },
            secret: SecretString::from(secret.into()),
        }
    }

    /// Override the enable secret.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = SecretString::from(secret.into());
        self
    }
}

/// Identifies one physical or virtual device. Immutable once built.
#[derive(Debug, Clone)]
pub struct DeviceIdentity {
    /// Fabric role, e.g. `dc1-leaf1`.
    pub role: String,

    /// Management address.
    pub host: String,

    /// Login material.
    pub credentials: Credentials,

    /// CLI dialect.
    pub platform: Platform,
}

impl DeviceIdentity {
    pub fn new(
        role: impl Into<String>,
        host: impl Into<String>,
        credentials: Credentials,
        platform: Platform,
    ) -> Self {
        Self {
            role: role.into(),
            host: host.into(),
            credentials,
            platform,
        }
    }

    /// Human-readable role name used in check messages.
    pub fn display_name(&self) -> String {
        display_name(&self.role)
    }
}

/// Turn a role such as `dc1-spine1` into `DC1 Spine1`.
pub fn display_name(role: &str) -> String {
    role.split(['-', '_'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let is_site = part.get(..2).is_some_and(|p| p.eq_ignore_ascii_case("dc"))
                && part
                    .get(2..)
                    .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()));
            if is_site {
                return part.to_ascii_uppercase();
            }
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// One inventory entry.
#[derive(Debug, Clone)]
pub struct DeviceRecord {
    /// How to reach the device.
    pub identity: DeviceIdentity,

    /// Router loopback, pinged by the smoke checks.
    pub loopback: Option<IpAddr>,
}

/// Role-ordered device inventory.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    devices: IndexMap<String, DeviceRecord>,
}

impl Inventory {
    /// Create an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// The two-datacenter lab fabric.
    pub fn lab() -> Self {
        const LAB: [(&str, &str, [u8; 4]); 5] = [
            ("dc1-spine1", "172.20.20.2", [10, 0, 0, 1]),
            ("dc1-spine2", "172.20.20.3", [10, 0, 0, 2]),
            ("dc1-leaf1", "172.20.20.4", [10, 0, 0, 10]),
            ("dc2-spine1", "172.20.20.8", [10, 0, 1, 1]),
            ("dc2-leaf1", "172.20.20.10", [10, 0, 1, 10]),
        ];

        let mut inventory = Self::new();
        for (role, host, loopback) in LAB {
            let identity = DeviceIdentity::new(
                role,
                host,
                Credentials::password(DEFAULT_USERNAME, "admin"),
                Platform::AristaEos,
            );
            inventory.devices.insert(
                role.to_string(),
                DeviceRecord {
                    identity,
                    loopback: Some(IpAddr::from(loopback)),
                },
            );
        }
        inventory
    }

    /// Add a device. Roles are unique.
    pub fn insert(&mut self, identity: DeviceIdentity, loopback: Option<IpAddr>) -> Result<()> {
        if self.devices.contains_key(&identity.role) {
            return Err(InventoryError::DuplicateRole {
                role: identity.role,
            }
            .into());
        }
        self.devices
            .insert(identity.role.clone(), DeviceRecord { identity, loopback });
        Ok(())
    }

    /// Look up the identity for a role.
    pub fn get(&self, role: &str) -> Option<&DeviceIdentity> {
        self.devices.get(role).map(|record| &record.identity)
    }

    /// Role names in inventory order.
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.devices.keys().map(String::as_str)
    }

    /// All records in inventory order.
    pub fn records(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.devices.values()
    }

    /// Every known loopback, in inventory order.
    pub fn loopbacks(&self) -> Vec<IpAddr> {
        self.devices.values().filter_map(|r| r.loopback).collect()
    }

    /// Loopback of one role.
    pub fn loopback(&self, role: &str) -> Option<IpAddr> {
        self.devices.get(role).and_then(|r| r.loopback)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Replace the credentials of every device.
    pub fn set_credentials(&mut self, credentials: &Credentials) {
        for record in self.devices.values_mut() {
            record.identity.credentials = credentials.clone();
        }
    }

    /// Parse an inventory document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: InventoryFile = serde_json::from_str(json).map_err(InventoryError::Parse)?;

        let mut inventory = Self::new();
        for entry in file.devices {
            let settings = entry.settings.or(&file.defaults);
            let credentials = settings.credentials(&entry.role)?;
            let identity = DeviceIdentity::new(
                entry.role,
                entry.host,
                credentials,
                settings.platform.unwrap_or_default(),
            );
            inventory.insert(identity, entry.loopback)?;
        }
        debug!("Loaded inventory with {} devices", inventory.len());
        Ok(inventory)
    }

    /// Read and parse an inventory file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| InventoryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct InventoryFile {
    #[serde(default)]
    defaults: DeviceSettings,
    devices: Vec<DeviceEntry>,
}

#[derive(Debug, Deserialize)]
struct DeviceEntry {
    role: String,
    host: String,
    #[serde(default)]
    loopback: Option<IpAddr>,
    #[serde(flatten)]
    settings: DeviceSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DeviceSettings {
    username: Option<String>,
    password: Option<String>,
    secret: Option<String>,
    private_key: Option<PathBuf>,
    platform: Option<Platform>,
}

impl DeviceSettings {
    /// Fill unset fields from `defaults`.
    fn or(self, defaults: &DeviceSettings) -> DeviceSettings {
        DeviceSettings {
            username: self.username.or_else(|| defaults.username.clone()),
            password: self.password.or_else(|| defaults.password.clone()),
            secret: self.secret.or_else(|| defaults.secret.clone()),
            private_key: self.private_key.or_else(|| defaults.private_key.clone()),
            platform: self.platform.or(defaults.platform),
        }
    }

    fn credentials(&self, role: &str) -> Result<Credentials> {
        let username = self.username.as_deref().unwrap_or(DEFAULT_USERNAME);

        let credentials = match (&self.private_key, &self.password) {
            (Some(key), password) => {
                let secret = self.secret.clone().or_else(|| password.clone()).unwrap_or_default();
                Credentials::private_key(username, key, secret)
            }
            (None, Some(password)) => Credentials::password(username, password.clone()),
            (None, None) => {
                return Err(InventoryError::MissingCredentials {
                    role: role.to_string(),
                }
                .into());
            }
        };

        Ok(match (&self.private_key, &self.secret) {
            (None, Some(secret)) => credentials.with_secret(secret.clone()),
            _ => credentials,
        })
    }
}
