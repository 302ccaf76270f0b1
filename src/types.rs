//! Typed records exchanged with the Route53 API.
//!
//! These are validated at the provider boundary so that the rest of the crate never deals with
//! raw API shapes.

use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::name::DomainName;

/// Record types that Route53 manages itself at the zone apex
pub const APEX_TYPES: [&str; 2] = ["SOA", "NS"];

/// Propagation state of a submitted change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChangeStatus {
    Pending,
    InSync,
}
impl Display for ChangeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeStatus::Pending => write!(f, "PENDING"),
            ChangeStatus::InSync => write!(f, "INSYNC"),
        }
    }
}

/// Tracking handle for an asynchronous change (zone creation, record batch, ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeInfo {
    pub id: String,
    pub status: ChangeStatus,
    pub submitted_at: Option<DateTime<Utc>>,
}

/// A hosted zone as reported by the zone listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedZone {
    pub id: String,
    pub name: DomainName,
    pub caller_reference: String,
    pub private: bool,
    pub record_count: u64,
    pub comment: Option<String>,
}

/// A zone created through this crate.
///
/// Everything except the change status is fixed at creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    pub name: DomainName,
    pub id: String,
    /// Nameservers in the order the provider returned them
    pub nameservers: Vec<String>,
    pub caller_reference: String,
    change_status: ChangeStatus,
}

impl Zone {
    pub fn new(
        name: DomainName,
        id: String,
        nameservers: Vec<String>,
        caller_reference: String,
        change_status: ChangeStatus,
    ) -> Self {
        Zone {
            name,
            id,
            nameservers,
            caller_reference,
            change_status,
        }
    }

    pub fn change_status(&self) -> ChangeStatus {
        self.change_status
    }

    /// Record the outcome of a change belonging to this zone.
    /// A zone that is in sync never goes back to pending.
    pub fn track(&mut self, change: &ChangeInfo) {
        if self.change_status == ChangeStatus::Pending {
            self.change_status = change.status;
        }
    }
}

impl AsRef<DomainName> for Zone {
    fn as_ref(&self) -> &DomainName {
        &self.name
    }
}

/// Result of a successful zone creation: the zone plus the change that tracks its propagation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedZone {
    pub zone: Zone,
    pub change: ChangeInfo,
}

/// A VPC association of a private hosted zone
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Vpc {
    pub region: String,
    pub id: String,
}

/// Zone metadata as returned by a zone lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneDetails {
    pub zone: HostedZone,
    pub nameservers: Vec<String>,
    pub vpcs: Vec<Vpc>,
}

/// Request parameters for creating a hosted zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateZoneRequest {
    pub name: DomainName,
    pub caller_reference: String,
    pub vpc: Option<Vpc>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AliasTarget {
    pub hosted_zone_id: String,
    pub dns_name: String,
    pub evaluate_target_health: bool,
}

/// All records sharing a name and type within a zone
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResourceRecordSet {
    pub name: DomainName,
    #[serde(rename = "type")]
    pub rr_type: String,
    pub ttl: u32,
    pub values: Vec<String>,
    /// Distinguishes weighted, latency and similar record sets sharing a name and type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias_target: Option<AliasTarget>,
}

impl ResourceRecordSet {
    pub fn new(name: DomainName, rr_type: &str, ttl: u32, values: Vec<String>) -> Self {
        ResourceRecordSet {
            name,
            rr_type: rr_type.to_ascii_uppercase(),
            ttl,
            values,
            set_identifier: None,
            alias_target: None,
        }
    }

    /// Whether this is one of the provider-managed SOA/NS sets at the apex of `zone`
    pub fn is_apex_of(&self, zone: &DomainName) -> bool {
        self.name == *zone
            && APEX_TYPES
                .iter()
                .any(|t| self.rr_type.eq_ignore_ascii_case(t))
    }
}

/// Simulated resolver answer from the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsAnswer {
    pub nameserver: String,
    pub record_name: String,
    pub record_type: String,
    pub record_data: Vec<String>,
    pub response_code: String,
    pub protocol: String,
}
