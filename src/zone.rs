//! Zone lifecycle: creation, lookup, emptying, deletion and change propagation.

use std::time::Instant;

use log::{debug, info, trace};

use crate::{
    cancel::CancelToken,
    changes::ChangeBatch,
    config::{ManagerConfig, WaitOptions, MAX_ITEMS},
    delegation::Delegation,
    error::R53Error,
    name::DomainName,
    pager::Pager,
    provider::{Page, RecordCursor, Route53Api, ZoneCursor},
    types::{
        ChangeInfo, ChangeStatus, CreateZoneRequest, CreatedZone, DnsAnswer, HostedZone,
        ResourceRecordSet, Vpc, Zone, ZoneDetails,
    },
};

/// Options for [`ZoneManager::create_zone()`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CreateZoneOptions {
    /// Create a private zone. Requires `vpc_region` and `vpc_id`
    pub private: bool,
    pub vpc_region: Option<String>,
    pub vpc_id: Option<String>,
    pub comment: Option<String>,
}

/// Performs zone operations against a [`Route53Api`].
///
/// Operations on different zones are independent. Operations that modify the same zone
/// (e.g. [`ZoneManager::delete_zone()`]) must not be run concurrently for that zone.
pub struct ZoneManager<'a> {
    api: &'a dyn Route53Api,
    config: ManagerConfig,
}

impl<'a> ZoneManager<'a> {
    pub fn new(api: &'a dyn Route53Api, config: ManagerConfig) -> Self {
        ZoneManager { api, config }
    }

    fn page_size(&self) -> u32 {
        self.config.page_size.clamp(1, MAX_ITEMS)
    }

    /// Lazily iterate over all hosted zones of the account
    pub fn zones(&self) -> impl Iterator<Item = Result<HostedZone, R53Error>> + 'a {
        let api = self.api;
        let max_items = self.page_size();
        Pager::new(
            "ListHostedZonesByName",
            move |cursor: Option<ZoneCursor>| -> Result<Page<HostedZone, ZoneCursor>, R53Error> {
                trace!("Listing zones, cursor {:?}", cursor);
                let request = format!(
                    "ListHostedZonesByName(max_items={}, start={})",
                    max_items,
                    cursor.as_ref().map_or("-".to_string(), |c| c.to_string())
                );
                api.list_zones_page(max_items, cursor)
                    .map_err(|source| R53Error::Listing { request, source })
            },
        )
    }

    /// Lazily iterate over all record sets in a zone
    pub fn rrsets(
        &self,
        zone_id: &str,
    ) -> impl Iterator<Item = Result<ResourceRecordSet, R53Error>> + 'a {
        let api = self.api;
        let max_items = self.page_size();
        let zone_id = zone_id.to_owned();
        Pager::new(
            "ListResourceRecordSets",
            move |cursor: Option<RecordCursor>| -> Result<Page<ResourceRecordSet, RecordCursor>, R53Error> {
                trace!("Listing record sets of {}, cursor {:?}", zone_id, cursor);
                let request = format!(
                    "ListResourceRecordSets(zone_id={}, max_items={}, start={})",
                    zone_id,
                    max_items,
                    cursor.as_ref().map_or("-".to_string(), |c| c.to_string())
                );
                api.list_rrsets_page(&zone_id, max_items, cursor)
                    .map_err(|source| R53Error::Listing { request, source })
            },
        )
    }

    /// Create a hosted zone.
    ///
    /// `name` may be given with or without the trailing dot. Each call uses a fresh caller
    /// reference, so repeating a call creates another zone with the same name.
    pub fn create_zone(
        &self,
        name: &str,
        options: &CreateZoneOptions,
    ) -> Result<CreatedZone, R53Error> {
        let name: DomainName = name.parse()?;

        let vpc = if options.private {
            match (&options.vpc_region, &options.vpc_id) {
                (Some(region), Some(id)) => Some(Vpc {
                    region: region.to_owned(),
                    id: id.to_owned(),
                }),
                _ => {
                    return Err(R53Error::Config(format!(
                        "private zone {} needs both a VPC region and a VPC id",
                        name
                    )))
                }
            }
        } else {
            None
        };

        let request = CreateZoneRequest {
            name: name.clone(),
            caller_reference: (self.config.caller_ref)(),
            vpc,
            comment: options.comment.clone(),
        };
        debug!(
            "Creating zone {} with caller reference {}",
            name, request.caller_reference
        );

        let created = self
            .api
            .create_hosted_zone(&request)
            .map_err(|source| R53Error::ZoneCreation {
                name: name.to_string(),
                source,
            })?;
        info!(
            "Created zone {} with id {}, change {} is {}",
            created.zone.name, created.zone.id, created.change.id, created.change.status
        );
        Ok(created)
    }

    /// Fetch zone metadata, including nameservers and associated VPCs
    pub fn get_zone(&self, zone_id: &str) -> Result<ZoneDetails, R53Error> {
        self.api
            .get_hosted_zone(zone_id)
            .map_err(|source| R53Error::Provider {
                operation: format!("GetHostedZone({})", zone_id),
                source,
            })
    }

    /// VPCs a private zone is associated with. Empty for public zones
    pub fn associated_vpcs(&self, zone_id: &str) -> Result<Vec<Vpc>, R53Error> {
        Ok(self.get_zone(zone_id)?.vpcs)
    }

    /// Find the id of the only zone called `name`.
    ///
    /// Route53 allows several zones with the same name, so the whole listing is scanned.
    pub fn name_to_zone_id(&self, name: &str) -> Result<String, R53Error> {
        let name: DomainName = name.parse()?;

        let mut ids = Vec::new();
        for zone in self.zones() {
            let zone = zone?;
            if zone.name == name {
                ids.push(zone.id);
            }
        }

        match ids.len() {
            0 => Err(R53Error::NotFound {
                what: "zone",
                name: name.to_string(),
            }),
            1 => Ok(ids.remove(0)),
            _ => Err(R53Error::AmbiguousName {
                name: name.to_string(),
                ids,
            }),
        }
    }

    /// Fetch a single record set by name and type
    pub fn get_rrset(
        &self,
        zone_id: &str,
        name: &str,
        rr_type: &str,
    ) -> Result<ResourceRecordSet, R53Error> {
        let name: DomainName = name.parse()?;
        let rr_type = rr_type.to_ascii_uppercase();
        let cursor = RecordCursor {
            name: name.to_string(),
            rr_type: rr_type.clone(),
            identifier: None,
        };
        let request = format!(
            "ListResourceRecordSets(zone_id={}, max_items=1, start={})",
            zone_id, cursor
        );

        let page = self
            .api
            .list_rrsets_page(zone_id, 1, Some(cursor))
            .map_err(|source| R53Error::Listing { request, source })?;

        page.items
            .into_iter()
            .next()
            .filter(|r| r.name == name && r.rr_type == rr_type)
            .ok_or_else(|| R53Error::NotFound {
                what: "record set",
                name: format!("{} {}", name, rr_type),
            })
    }

    /// Submit a batch of changes to a zone.
    ///
    /// Empty batches are not submitted, in which case [`None`] is returned.
    pub fn submit(
        &self,
        zone_id: &str,
        batch: &ChangeBatch,
    ) -> Result<Option<ChangeInfo>, R53Error> {
        if batch.snapshot().is_none() {
            debug!("Nothing to submit for zone {}", zone_id);
            return Ok(None);
        }
        let change = self
            .api
            .change_rrsets(zone_id, batch)
            .map_err(|source| R53Error::ChangeSubmission {
                zone_id: zone_id.to_owned(),
                changes: batch.len(),
                source,
            })?;
        debug!(
            "Submitted {} change(s) to zone {} as {}",
            batch.len(),
            zone_id,
            change.id
        );
        Ok(Some(change))
    }

    /// Create the NS record set for `delegation.child` in `delegation.parent`
    pub fn delegate(
        &self,
        delegation: &Delegation<'_, Zone>,
        ttl: u32,
    ) -> Result<Option<ChangeInfo>, R53Error> {
        let (parent, child) = (delegation.parent, delegation.child);
        info!("Delegating {} from {}", child.name, parent.name);

        let mut batch = ChangeBatch::new();
        batch.create(child.name.clone(), "NS", ttl, child.nameservers.clone());
        self.submit(&parent.id, &batch)
    }

    /// Delete every record set of a zone except the apex SOA and NS sets.
    ///
    /// If `zone_name` is not given it is looked up first. All deletions go out as one batch,
    /// nothing is submitted if the zone only holds its apex records.
    pub fn empty_zone(
        &self,
        zone_id: &str,
        zone_name: Option<&DomainName>,
    ) -> Result<Option<ChangeInfo>, R53Error> {
        let zone_name = match zone_name {
            Some(n) => n.clone(),
            None => self.get_zone(zone_id)?.zone.name,
        };

        let batch = deletion_batch(&zone_name, self.rrsets(zone_id))?;
        debug!(
            "Emptying zone {} ({}): {} record set(s) to delete",
            zone_name,
            zone_id,
            batch.len()
        );
        self.submit(zone_id, &batch)
    }

    /// Empty a zone, then delete it.
    ///
    /// The provider refuses to delete zones holding anything but their apex records, so the
    /// two steps always run in this order.
    pub fn delete_zone(
        &self,
        zone_id: &str,
        zone_name: Option<&DomainName>,
    ) -> Result<Option<ChangeInfo>, R53Error> {
        self.empty_zone(zone_id, zone_name)?;

        let change = self
            .api
            .delete_hosted_zone(zone_id)
            .map_err(|source| R53Error::ZoneDeletion {
                zone_id: zone_id.to_owned(),
                source,
            })?;
        info!("Deleted zone {}", zone_id);
        Ok(change)
    }

    /// Poll a change until it is in sync.
    ///
    /// Fails once `options.timeout` has passed or `cancel` is triggered. Cancelling interrupts
    /// a running poll interval immediately. A zero poll interval is rejected.
    pub fn wait_for_insync(
        &self,
        change_id: &str,
        options: &WaitOptions,
        cancel: &CancelToken,
    ) -> Result<ChangeInfo, R53Error> {
        if options.poll_interval.is_zero() {
            return Err(R53Error::Config(format!(
                "poll interval for change {} must be greater than zero",
                change_id
            )));
        }
        let started = Instant::now();
        let cancelled = || R53Error::Cancelled {
            change_id: change_id.to_owned(),
        };

        loop {
            if cancel.is_cancelled() {
                return Err(cancelled());
            }

            let change = self
                .api
                .get_change(change_id)
                .map_err(|source| R53Error::Provider {
                    operation: format!("GetChange({})", change_id),
                    source,
                })?;
            if change.status == ChangeStatus::InSync {
                debug!(
                    "Change {} in sync after {:?}",
                    change_id,
                    started.elapsed()
                );
                return Ok(change);
            }
            trace!("Change {} still {}", change_id, change.status);

            let mut nap = options.poll_interval;
            if let Some(timeout) = options.timeout {
                let waited = started.elapsed();
                if waited >= timeout {
                    return Err(R53Error::PropagationTimeout {
                        change_id: change_id.to_owned(),
                        waited,
                    });
                }
                nap = nap.min(timeout - waited);
            }
            if cancel.sleep(nap) {
                return Err(cancelled());
            }
        }
    }

    /// Ask the provider how it would answer a query for `name`/`rr_type` in the given zone
    pub fn test_dns_answer(
        &self,
        zone_id: &str,
        name: &str,
        rr_type: &str,
    ) -> Result<DnsAnswer, R53Error> {
        let name: DomainName = name.parse()?;
        let rr_type = rr_type.to_ascii_uppercase();
        self.api
            .test_dns_answer(zone_id, &name, &rr_type)
            .map_err(|source| R53Error::Provider {
                operation: format!("TestDNSAnswer({}, {} {})", zone_id, name, rr_type),
                source,
            })
    }
}

/// Build the batch deleting everything in `zone_name` except its apex SOA and NS sets.
///
/// Stops at the first listing error.
pub fn deletion_batch<I>(zone_name: &DomainName, rrsets: I) -> Result<ChangeBatch, R53Error>
where
    I: IntoIterator<Item = Result<ResourceRecordSet, R53Error>>,
{
    let mut batch = ChangeBatch::new();
    for rrset in rrsets {
        let rrset = rrset?;
        if rrset.is_apex_of(zone_name) {
            trace!("Keeping apex record set {} {}", rrset.name, rrset.rr_type);
            continue;
        }
        batch.delete(rrset);
    }
    Ok(batch)
}
