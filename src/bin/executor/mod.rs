use std::time::Instant;

use log::error;
use r53utils::{
    bulk::{CreateZonesOptions, Progress},
    cancel::CancelToken,
    config::{ManagerConfig, WaitOptions},
    present::{dns_answer_to_text, rrset_to_text, zone_info, zone_summary},
    provider::Route53Api,
    types::Zone,
    zone::{CreateZoneOptions, ZoneManager},
    R53Error,
};
use thiserror::Error;

use crate::cli::Command;

#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error(transparent)]
    Route53(#[from] R53Error),
    #[error("could not write output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Process exit code for a failed command
pub fn exit_code(e: &ExecutorError) -> i32 {
    match e {
        ExecutorError::Route53(e) => match e {
            R53Error::Listing { .. } => 2,
            R53Error::ZoneCreation { .. } => 3,
            R53Error::ZoneDeletion { .. } => 4,
            R53Error::ChangeSubmission { .. } => 5,
            R53Error::NotFound { .. } => 6,
            R53Error::AmbiguousName { .. } => 7,
            R53Error::PropagationTimeout { .. } => 8,
            R53Error::Config(_) => 9,
            R53Error::Cancelled { .. } => 10,
            R53Error::Provider { .. } => 11,
            R53Error::InvalidName(_) => 12,
        },
        ExecutorError::Output(_) => 13,
    }
}

// Prints what a bulk operation is doing
fn print_progress(p: Progress<'_>) {
    match p {
        Progress::Creating(name) => println!("Creating zone: {}", name),
        Progress::Created(zone) => println!("{}", zone_info(zone)),
        Progress::WaitingForInSync(_) => println!("Zone created. Waiting for IN-SYNC ..."),
        Progress::InSync { waited, .. } => {
            println!("Time to IN-SYNC: {:.2}s", waited.as_secs_f64())
        }
        Progress::Delegating(d) => {
            println!("Creating delegation: {} -> {}", d.parent.name, d.child.name)
        }
        Progress::Deleted(zone) => println!("DELETED zone: {} {}", zone.name, zone.id),
        Progress::Failed(e) => error!("{}", e),
    }
}

/// Runs a single [`Command`] and prints its results to stdout
pub struct Executor<'a> {
    manager: ZoneManager<'a>,
    wait: WaitOptions,
    cancel: CancelToken,
}

impl<'a> Executor<'a> {
    pub fn new(
        api: &'a dyn Route53Api,
        page_size: u32,
        wait: WaitOptions,
        cancel: CancelToken,
    ) -> Self {
        Executor {
            manager: ZoneManager::new(
                api,
                ManagerConfig {
                    page_size,
                    ..Default::default()
                },
            ),
            wait,
            cancel,
        }
    }

    pub fn run(&self, command: Command) -> Result<(), ExecutorError> {
        match command {
            Command::ListZones => {
                for zone in self.manager.zones() {
                    println!("{}", zone_summary(&zone?));
                }
            }
            Command::ListRrsets { zone_id, json } => {
                if json {
                    let rrsets = self
                        .manager
                        .rrsets(&zone_id)
                        .collect::<Result<Vec<_>, _>>()?;
                    println!("{}", serde_json::to_string(&rrsets)?);
                } else {
                    for rrset in self.manager.rrsets(&zone_id) {
                        println!("{}", rrset_to_text(&rrset?));
                    }
                }
            }
            Command::GetRrset {
                zone_id,
                name,
                rr_type,
            } => {
                let rrset = self.manager.get_rrset(&zone_id, &name, &rr_type)?;
                println!("{}", rrset_to_text(&rrset));
            }
            Command::ZoneId { name } => {
                println!("{}", self.manager.name_to_zone_id(&name)?);
            }
            Command::CreateZones {
                names,
                no_delegate,
                ns_ttl,
                wait,
            } => {
                let options = CreateZonesOptions {
                    delegation_ttl: (!no_delegate).then_some(ns_ttl),
                    wait: wait.then_some((&self.wait, &self.cancel)),
                };
                self.manager
                    .create_zones(names.as_slice(), &options, print_progress)
                    .into_result()?;
            }
            Command::CreatePrivateZone {
                name,
                region,
                vpc_id,
                wait,
            } => {
                let options = CreateZoneOptions {
                    private: true,
                    vpc_region: Some(region),
                    vpc_id: Some(vpc_id),
                    comment: None,
                };
                println!("Creating zone: {}", name);
                let created = self.manager.create_zone(&name, &options)?;
                let mut zone = created.zone;
                println!("{}", zone_info(&zone));
                if wait {
                    self.wait_for_zone(&mut zone, &created.change.id)?;
                }
            }
            Command::DeleteZones { names } => {
                self.manager
                    .delete_zones(names.as_slice(), print_progress)?
                    .into_result()?;
            }
            Command::DeleteZone { zone_id } => {
                self.manager.delete_zone(&zone_id, None)?;
                println!("DELETED zone: {}", zone_id);
            }
            Command::TestDnsAnswer {
                zone_id,
                name,
                rr_type,
            } => {
                let answer = self.manager.test_dns_answer(&zone_id, &name, &rr_type)?;
                println!("{}", dns_answer_to_text(&answer));
            }
            Command::Wait { change_id } => {
                let started = Instant::now();
                let change = self
                    .manager
                    .wait_for_insync(&change_id, &self.wait, &self.cancel)?;
                println!(
                    "{} {} after {:.2}s",
                    change.id,
                    change.status,
                    started.elapsed().as_secs_f64()
                );
            }
        }
        Ok(())
    }

    fn wait_for_zone(&self, zone: &mut Zone, change_id: &str) -> Result<(), R53Error> {
        print_progress(Progress::WaitingForInSync(zone));
        let started = Instant::now();
        let change = self
            .manager
            .wait_for_insync(change_id, &self.wait, &self.cancel)?;
        zone.track(&change);
        print_progress(Progress::InSync {
            zone,
            waited: started.elapsed(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use r53utils::provider::ProviderError;
    use serde::ser::Error as _;

    use super::*;

    #[test]
    fn should_map_errors_to_distinct_codes() {
        let source = ProviderError::new(None, "boom".to_string());
        let errors = [
            R53Error::Listing {
                request: "ListHostedZonesByName".to_string(),
                source,
            },
            R53Error::NotFound {
                what: "zone",
                name: "example.com.".to_string(),
            },
            R53Error::PropagationTimeout {
                change_id: "/change/C1".to_string(),
                waited: Duration::from_secs(600),
            },
            R53Error::Cancelled {
                change_id: "/change/C1".to_string(),
            },
            R53Error::Config("private zones need a VPC".to_string()),
        ];
        let codes = errors
            .into_iter()
            .map(|e| exit_code(&e.into()))
            .collect::<Vec<_>>();
        assert_eq!(codes, vec![2, 6, 8, 10, 9]);
    }

    #[test]
    fn should_fail_on_output_errors() {
        let e = ExecutorError::from(serde_json::Error::custom("broken pipe"));
        assert_eq!(exit_code(&e), 13);
    }
}
