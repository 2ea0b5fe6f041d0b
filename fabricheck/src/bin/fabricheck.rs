//! fabricheck command-line runner.
//!
//! Runs the default fabric suite against the lab inventory or an inventory
//! file and prints one line per check.
//!
//! # Usage
//!
//! ```bash
//! fabricheck --user admin --password admin
//! fabricheck --inventory fabric.json --group underlay --group overlay --json
//! ```
//!
//! Exit status is 0 when no check failed, 1 when one did and 2 on a usage
//! or inventory error. Skipped checks do not change it.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use log::{error, info};

use fabricheck::checks::GROUPS;
use fabricheck::{
    ConnectionProfile, Credentials, HostKeyVerification, Inventory, Runner, SshConnector, Suite,
    fabric_suite,
};

const EXIT_FAILED: u8 = 1;
const EXIT_USAGE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match Args::parse(env::args().skip(1)) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help) => {
            Args::print_help();
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("Error: {message}\n\nRun with --help for usage.");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    let mut inventory = match &args.inventory {
        Some(path) => match Inventory::from_path(path) {
            Ok(inventory) => inventory,
            Err(e) => {
                error!("Cannot load inventory {}: {}", path.display(), e);
                return ExitCode::from(EXIT_USAGE);
            }
        },
        None => Inventory::lab(),
    };
    if let Some(credentials) = args.credentials() {
        inventory.set_credentials(&credentials);
    }

    let suite = fabric_suite(&inventory).filter(&args.groups);
    if args.list {
        print_suite(&suite);
        return ExitCode::SUCCESS;
    }

    let mut profile = ConnectionProfile::default()
        .with_port(args.port)
        .with_timeout(Duration::from_secs(args.timeout))
        .with_delay_factor(args.delay_factor)
        .with_host_key_verification(args.host_keys);
    if let Some(path) = &args.known_hosts {
        profile = profile.with_known_hosts(path);
    }

    info!(
        "Validating {} devices, {} checks in {} groups",
        inventory.len(),
        suite.len(),
        suite.groups.len()
    );
    let runner = Runner::new(SshConnector, inventory, profile);
    let report = runner.run(&suite).await;

    if args.json {
        match report.to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!("Cannot serialize report: {}", e);
                return ExitCode::from(EXIT_FAILED);
            }
        }
    } else {
        println!("{report}");
    }

    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_FAILED)
    }
}

fn print_suite(suite: &Suite) {
    for group in &suite.groups {
        println!("{}", group.name);
        for check in &group.checks {
            println!("  {} [{}]", check.name, check.kind.roles().join(", "));
        }
    }
}

enum Command {
    Run(Args),
    Help,
}

/// Simple argument parser
#[derive(Debug, Default)]
struct Args {
    inventory: Option<PathBuf>,
    user: Option<String>,
    password: Option<String>,
    secret: Option<String>,
    key: Option<PathBuf>,
    port: u16,
    timeout: u64,
    delay_factor: u32,
    host_keys: HostKeyVerification,
    known_hosts: Option<PathBuf>,
    groups: Vec<String>,
    json: bool,
    list: bool,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Command, String> {
        let mut parsed = Args {
            port: 22,
            timeout: 30,
            delay_factor: 2,
            ..Args::default()
        };

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let mut value = |flag: &str| args.next().ok_or_else(|| format!("{flag} needs a value"));
            match arg.as_str() {
                "--inventory" | "-i" => parsed.inventory = Some(PathBuf::from(value(arg.as_str())?)),
                "--user" | "-u" => parsed.user = Some(value(arg.as_str())?),
                "--password" | "-P" => parsed.password = Some(value(arg.as_str())?),
                "--secret" | "-s" => parsed.secret = Some(value(arg.as_str())?),
                "--key" | "-k" => parsed.key = Some(PathBuf::from(value(arg.as_str())?)),
                "--port" | "-p" => parsed.port = number(arg.as_str(), &value(arg.as_str())?)?,
                "--timeout" | "-t" => parsed.timeout = number(arg.as_str(), &value(arg.as_str())?)?,
                "--delay-factor" => parsed.delay_factor = number(arg.as_str(), &value(arg.as_str())?)?,
                "--host-keys" => parsed.host_keys = value(arg.as_str())?.parse()?,
                "--known-hosts" => parsed.known_hosts = Some(PathBuf::from(value(arg.as_str())?)),
                "--group" | "-g" => {
                    let group = value(arg.as_str())?;
                    if !GROUPS.contains(&group.as_str()) {
                        return Err(format!(
                            "unknown group '{group}' (expected one of: {})",
                            GROUPS.join(", ")
                        ));
                    }
                    parsed.groups.push(group);
                }
                "--json" => parsed.json = true,
                "--list" => parsed.list = true,
                "--help" | "-h" => return Ok(Command::Help),
                other => return Err(format!("unexpected argument '{other}'")),
            }
        }

        Ok(Command::Run(parsed))
    }

    /// Credentials from the flags, replacing the inventory's for every device.
    fn credentials(&self) -> Option<Credentials> {
        if self.user.is_none() && self.password.is_none() && self.secret.is_none() && self.key.is_none() {
            return None;
        }

        let user = self.user.as_deref().unwrap_or("admin");
        let credentials = match (&self.key, &self.password) {
            (Some(key), password) => {
                let secret = self.secret.as_ref().or(password.as_ref()).cloned().unwrap_or_default();
                Credentials::private_key(user, key, secret)
            }
            (None, password) => Credentials::password(user, password.as_deref().unwrap_or("admin")),
        };

        Some(match (&self.key, &self.secret) {
            (None, Some(secret)) => credentials.with_secret(secret),
            _ => credentials,
        })
    }

    fn print_help() {
        println!(
            r#"fabricheck

Validates BGP underlay, EVPN/VXLAN overlay, interface health and inter-DC
reachability of a two-datacenter fabric over SSH.

USAGE:
    fabricheck [OPTIONS]

OPTIONS:
    -i, --inventory <FILE>   JSON inventory [default: built-in lab fabric]
    -u, --user <USER>        Username for every device [default: admin]
    -P, --password <PASS>    Password for every device [default: admin]
    -s, --secret <SECRET>    Enable secret [default: the password]
    -k, --key <PATH>         Path to SSH private key
    -p, --port <PORT>        SSH port [default: 22]
    -t, --timeout <SECS>     Base timeout [default: 30]
        --delay-factor <N>   Timeout multiplier [default: 2]
        --host-keys <MODE>   strict, accept-new or off [default: off]
        --known-hosts <FILE> known_hosts file [default: ~/.ssh/known_hosts]
    -g, --group <NAME>       Run only this group (repeatable)
        --json               Print the report as JSON
        --list               List the selected checks and exit
    -h, --help               Print this help message

GROUPS:
    {}

Credential flags replace the credentials of every inventory device.
Set RUST_LOG=debug to see every command sent."#,
            GROUPS.join(", ")
        );
    }
}

fn number<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("{flag} expects a number, got '{value}'"))
}
