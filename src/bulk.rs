//! Operations on several zones at once.
//!
//! A failure on one zone never stops the others. Every failure is kept in the returned
//! [`BulkReport`], the last one decides the overall outcome.

use std::time::{Duration, Instant};

use log::{info, warn};

use crate::{
    cancel::CancelToken,
    config::WaitOptions,
    delegation::{compute_delegations, Delegation},
    error::R53Error,
    name::DomainName,
    types::{HostedZone, Zone},
    zone::{CreateZoneOptions, ZoneManager},
};

/// Steps of a bulk operation, reported as they happen
#[derive(Debug)]
pub enum Progress<'a> {
    Creating(&'a str),
    Created(&'a Zone),
    WaitingForInSync(&'a Zone),
    InSync { zone: &'a Zone, waited: Duration },
    Delegating(Delegation<'a, Zone>),
    Deleted(&'a HostedZone),
    Failed(&'a R53Error),
}

/// Outcome of a bulk operation
#[derive(Debug)]
pub struct BulkReport<T> {
    pub succeeded: Vec<T>,
    /// In the order they occurred
    pub failures: Vec<R53Error>,
}

impl<T> BulkReport<T> {
    fn new() -> Self {
        BulkReport {
            succeeded: Vec::new(),
            failures: Vec::new(),
        }
    }

    fn fail(&mut self, e: R53Error, progress: &mut impl FnMut(Progress<'_>)) {
        progress(Progress::Failed(&e));
        self.failures.push(e);
    }

    /// The successful items, or the last failure if there was any
    pub fn into_result(mut self) -> Result<Vec<T>, R53Error> {
        match self.failures.pop() {
            Some(e) => Err(e),
            None => Ok(self.succeeded),
        }
    }
}

/// Settings for [`ZoneManager::create_zones()`]
#[derive(Debug, Clone, Copy)]
pub struct CreateZonesOptions<'a> {
    /// TTL of the delegation NS records. No delegations are created if unset
    pub delegation_ttl: Option<u32>,
    /// Wait for each zone to be in sync before creating the next one
    pub wait: Option<(&'a WaitOptions, &'a CancelToken)>,
}

impl<'a> ZoneManager<'a> {
    /// Create public zones, then the delegations among those that were created.
    ///
    /// Cancelling a wait stops the creation of further zones. Delegations for the zones that
    /// exist by then are still submitted.
    pub fn create_zones<S: AsRef<str>>(
        &self,
        names: &[S],
        options: &CreateZonesOptions<'_>,
        mut progress: impl FnMut(Progress<'_>),
    ) -> BulkReport<Zone> {
        let mut report = BulkReport::new();

        for name in names {
            let name = name.as_ref();
            progress(Progress::Creating(name));
            let created = match self.create_zone(name, &CreateZoneOptions::default()) {
                Ok(c) => c,
                Err(e) => {
                    report.fail(e, &mut progress);
                    continue;
                }
            };
            let mut zone = created.zone;
            progress(Progress::Created(&zone));

            let mut cancelled = false;
            if let Some((wait, cancel)) = options.wait {
                progress(Progress::WaitingForInSync(&zone));
                let started = Instant::now();
                match self.wait_for_insync(&created.change.id, wait, cancel) {
                    Ok(change) => {
                        zone.track(&change);
                        progress(Progress::InSync {
                            zone: &zone,
                            waited: started.elapsed(),
                        });
                    }
                    Err(e) => {
                        cancelled = matches!(e, R53Error::Cancelled { .. });
                        report.fail(e, &mut progress);
                    }
                }
            }
            // The zone exists even if waiting for it failed
            report.succeeded.push(zone);
            if cancelled {
                warn!("Waiting was cancelled, not creating any further zones");
                break;
            }
        }

        let Some(ttl) = options.delegation_ttl else {
            info!("Skipping delegations");
            return report;
        };
        let mut delegation_failures = Vec::new();
        for delegation in compute_delegations(&report.succeeded) {
            progress(Progress::Delegating(delegation));
            if let Err(e) = self.delegate(&delegation, ttl) {
                progress(Progress::Failed(&e));
                delegation_failures.push(e);
            }
        }
        report.failures.extend(delegation_failures);
        report
    }

    /// Empty and delete every zone carrying one of `names`.
    ///
    /// Fails without deleting anything if a name is malformed or the zone listing fails.
    /// The full listing is read before the first deletion.
    pub fn delete_zones<S: AsRef<str>>(
        &self,
        names: &[S],
        mut progress: impl FnMut(Progress<'_>),
    ) -> Result<BulkReport<HostedZone>, R53Error> {
        let wanted = names
            .iter()
            .map(|n| n.as_ref().parse::<DomainName>())
            .collect::<Result<Vec<_>, _>>()?;

        let mut matching = Vec::new();
        for zone in self.zones() {
            let zone = zone?;
            if wanted.contains(&zone.name) {
                matching.push(zone);
            }
        }
        if matching.is_empty() {
            info!("No zones matched {}", itertools::join(&wanted, ", "));
        }

        let mut report = BulkReport::new();
        for zone in matching {
            match self.delete_zone(&zone.id, Some(&zone.name)) {
                Ok(_) => {
                    progress(Progress::Deleted(&zone));
                    report.succeeded.push(zone);
                }
                Err(e) => report.fail(e, &mut progress),
            }
        }
        Ok(report)
    }
}
