use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use r53utils::config::{WaitOptions, MAX_ITEMS, NS_TTL};

macro_rules! env_prefix {
    () => {
        "R53UTILS_"
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Set the loglevel of the application
    #[arg(
        value_enum,
        short = 'l',
        long,
        global = true,
        default_value_t = Loglevel::Info,
        value_name = "LEVEL",
        env = concat!(env_prefix!(), "LOGLEVEL")
    )]
    pub loglevel: Loglevel,

    /// AWS profile to take credentials from. Uses the default credential chain if unset
    #[arg(long, global = true, value_name = "PROFILE", env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// AWS region to send requests to
    #[arg(long, global = true, value_name = "REGION", env = concat!(env_prefix!(), "REGION"))]
    pub region: Option<String>,

    /// Number of items to request per listing page (at most 100)
    #[arg(
        long,
        global = true,
        default_value_t = MAX_ITEMS,
        value_parser = clap::value_parser!(u32).range(1..=MAX_ITEMS as i64),
        env = concat!(env_prefix!(), "PAGE_SIZE")
    )]
    pub page_size: u32,

    /// Seconds between change status checks while waiting for INSYNC
    #[arg(
        long,
        global = true,
        default_value_t = 5,
        value_parser = clap::value_parser!(u64).range(1..),
        value_name = "SECONDS",
        env = concat!(env_prefix!(), "POLL_INTERVAL")
    )]
    pub poll_interval: u64,

    /// Give up waiting for INSYNC after this many seconds. 0 waits indefinitely
    #[arg(
        long,
        global = true,
        default_value_t = 600,
        value_name = "SECONDS",
        env = concat!(env_prefix!(), "TIMEOUT")
    )]
    pub timeout: u64,
}

impl Cli {
    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions {
            poll_interval: Duration::from_secs(self.poll_interval),
            timeout: (self.timeout > 0).then(|| Duration::from_secs(self.timeout)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Subcommand)]
pub enum Command {
    /// Print all hosted zones: name, id, type and record set count
    ListZones,
    /// Print all record sets in a zone
    ListRrsets {
        zone_id: String,
        /// Print a JSON array instead of zone file lines
        #[arg(long, action, default_value_t = false)]
        json: bool,
    },
    /// Print a single record set
    GetRrset {
        zone_id: String,
        name: String,
        #[arg(value_name = "TYPE")]
        rr_type: String,
    },
    /// Print the id of the zone with the given name
    ZoneId { name: String },
    /// Create zones and the delegations between them
    CreateZones {
        #[arg(required = true)]
        names: Vec<String>,
        /// Do not add NS records for child zones to their parents
        #[arg(long, action, default_value_t = false)]
        no_delegate: bool,
        /// TTL of the delegation NS records
        #[arg(long, default_value_t = NS_TTL, value_name = "TTL")]
        ns_ttl: u32,
        /// Wait for each zone to be in sync before continuing
        #[arg(long, short = 'w', action, default_value_t = false)]
        wait: bool,
    },
    /// Create a private zone associated with a VPC
    CreatePrivateZone {
        name: String,
        region: String,
        vpc_id: String,
        /// Wait for the zone to be in sync
        #[arg(long, short = 'w', action, default_value_t = false)]
        wait: bool,
    },
    /// Delete all zones with the given names, including their records
    DeleteZones {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Delete a zone by id, including its records
    DeleteZone { zone_id: String },
    /// Show what the Route53 nameservers answer for a name and type
    TestDnsAnswer {
        zone_id: String,
        name: String,
        #[arg(value_name = "TYPE")]
        rr_type: String,
    },
    /// Wait for a change to be in sync
    Wait { change_id: String },
}

/// Used to set the applications loglevel
// This is essentially a re-creation of log:Level. However, that enum doesn't derive ValueEnum, so we have to do it manually here
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, ValueEnum)]
pub enum Loglevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}
impl From<Loglevel> for LevelFilter {
    fn from(ll: Loglevel) -> Self {
        match ll {
            Loglevel::Error => LevelFilter::Error,
            Loglevel::Warn => LevelFilter::Warn,
            Loglevel::Info => LevelFilter::Info,
            Loglevel::Debug => LevelFilter::Debug,
            Loglevel::Trace => LevelFilter::Trace,
        }
    }
}
