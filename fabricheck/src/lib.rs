//! # fabricheck
//!
//! Operational validation for multi-datacenter EVPN/VXLAN fabrics.
//!
//! fabricheck logs in to each device over SSH, runs fixed CLI commands and
//! asserts textual invariants on the output: BGP underlay sessions, the
//! VXLAN/EVPN overlay, interface health and inter-DC reachability.
//!
//! ## Layers
//!
//! - [`transport`], [`channel`], [`platform`] and [`driver`]: the SSH CLI
//!   session. Prompt-driven reads, privilege escalation, output cleanup.
//! - [`session::DeviceSession`]: one lazily opened connection per device.
//!   Faults become data, never errors.
//! - [`probe::FabricProbe`]: the queries the checks issue.
//! - [`checks`] and [`harness`]: group-scoped fixtures, pass/fail/skip
//!   outcomes and the report.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fabricheck::{ConnectionProfile, Inventory, Runner, SshConnector, fabric_suite};
//!
//! #[tokio::main]
//! async fn main() {
//!     let runner = Runner::new(SshConnector, Inventory::lab(), ConnectionProfile::default());
//!     let report = runner.run(&fabric_suite(runner.inventory())).await;
//!
//!     println!("{report}");
//!     std::process::exit(if report.is_success() { 0 } else { 1 });
//! }
//! ```

pub mod channel;
pub mod checks;
pub mod driver;
pub mod error;
pub mod harness;
pub mod inventory;
pub mod platform;
pub mod probe;
pub mod session;
pub mod transport;

pub use checks::{Check, CheckGroup, CheckKind, Suite, fabric_suite};
pub use driver::{Connection, ConnectionProfile, Connector, Response, SshConnector};
pub use error::{ConnectFault, ConnectFaultKind, Error};
pub use harness::{CheckResult, FixtureScope, Outcome, Report, Runner};
pub use inventory::{Credentials, DeviceIdentity, Inventory};
pub use platform::{Platform, PlatformDefinition, PrivilegeLevel};
pub use probe::FabricProbe;
pub use session::{CommandResult, DeviceSession};
pub use transport::{AuthMethod, HostKeyVerification, SshConfig};
