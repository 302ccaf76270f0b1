//! Access to the remote hosted-zone API.
//!
//! [`Route53Api`] is the only seam between this crate and the provider. Every method maps onto a
//! single remote call and speaks the typed records from [`crate::types`].
//! [`Route53Provider`] is the implementation backed by the AWS SDK.

mod route53;

#[cfg(test)]
use mockall::automock;

pub use self::route53::{Route53Provider, Route53ProviderConfig};

use std::fmt::Display;

use crate::{
    changes::ChangeBatch,
    name::DomainName,
    types::{
        ChangeInfo, CreateZoneRequest, CreatedZone, DnsAnswer, HostedZone, ResourceRecordSet,
        ZoneDetails,
    },
};

/// A provider gives access to the hosted zones of one account.
#[cfg_attr(test, automock)]
pub trait Route53Api {
    /// Fetch one page of the zone listing, starting at `cursor` if given
    fn list_zones_page(
        &self,
        max_items: u32,
        cursor: Option<ZoneCursor>,
    ) -> Result<Page<HostedZone, ZoneCursor>, ProviderError>;

    /// Fetch one page of the record sets in `zone_id`, starting at `cursor` if given
    fn list_rrsets_page(
        &self,
        zone_id: &str,
        max_items: u32,
        cursor: Option<RecordCursor>,
    ) -> Result<Page<ResourceRecordSet, RecordCursor>, ProviderError>;

    fn create_hosted_zone(&self, request: &CreateZoneRequest)
        -> Result<CreatedZone, ProviderError>;

    /// Submit all changes in `batch` as one atomic request
    fn change_rrsets(&self, zone_id: &str, batch: &ChangeBatch)
        -> Result<ChangeInfo, ProviderError>;

    /// Delete an (already emptied) zone.
    /// Returns a change handle if the provider reports one
    fn delete_hosted_zone(&self, zone_id: &str) -> Result<Option<ChangeInfo>, ProviderError>;

    fn get_change(&self, change_id: &str) -> Result<ChangeInfo, ProviderError>;

    fn get_hosted_zone(&self, zone_id: &str) -> Result<ZoneDetails, ProviderError>;

    /// Ask the provider what its nameservers would answer for `name`/`rr_type`
    fn test_dns_answer(
        &self,
        zone_id: &str,
        name: &DomainName,
        rr_type: &str,
    ) -> Result<DnsAnswer, ProviderError>;
}

/// One page of a listing.
///
/// `next` is only meaningful if `is_truncated` is set and must be passed back unchanged to
/// fetch the following page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T, C> {
    pub items: Vec<T>,
    pub is_truncated: bool,
    pub next: Option<C>,
}

/// Continuation point of the zone listing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ZoneCursor {
    pub dns_name: String,
    pub zone_id: String,
}

/// Continuation point of a record set listing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordCursor {
    pub name: String,
    pub rr_type: String,
    pub identifier: Option<String>,
}

impl Display for ZoneCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.dns_name, self.zone_id)
    }
}

impl Display for RecordCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.name, self.rr_type)?;
        if let Some(id) = &self.identifier {
            write!(f, "/{}", id)?;
        }
        Ok(())
    }
}

/// Generic error returned by a provider call.
/// Keeps the provider's error code (if any) and the full diagnostic text of its response
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderError {
    code: Option<String>,
    msg: String,
}

impl ProviderError {
    pub fn new(code: Option<String>, msg: String) -> Self {
        ProviderError { code, msg }
    }

    /// Error code reported by the provider, e.g. `NoSuchHostedZone`
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.msg
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "[{}] {}", code, self.msg),
            None => write!(f, "{}", self.msg),
        }
    }
}
impl std::error::Error for ProviderError {}

impl From<String> for ProviderError {
    fn from(s: String) -> Self {
        ProviderError { code: None, msg: s }
    }
}
