mod convert;

use std::time::Duration;

use aws_config::{meta::region::RegionProviderChain, timeout::TimeoutConfig, BehaviorVersion};
use aws_sdk_route53::{config::Region, types as sdk};
use log::{debug, trace};
use tokio::runtime::Runtime;

use self::convert::{convert_vpcs, parse_name, to_sdk_change};
use super::{Page, ProviderError, RecordCursor, Route53Api, ZoneCursor};
use crate::{
    changes::ChangeBatch,
    name::DomainName,
    types::{
        ChangeInfo, ChangeStatus, CreateZoneRequest, CreatedZone, DnsAnswer, HostedZone,
        ResourceRecordSet, Zone, ZoneDetails,
    },
};

// Route53 is a global service, its API lives in us-east-1
const DEFAULT_REGION: &str = "us-east-1";
const API_TIMEOUT: Duration = Duration::from_secs(30);

/// A [`Route53Api`] backed by the AWS SDK.
///
/// The SDK is asynchronous, so the provider owns a single-threaded runtime and blocks on each
/// request. Credentials are resolved through the standard AWS provider chain.
///
/// To create a provider, use the [`Route53Provider::from_config()`] function.
#[non_exhaustive]
pub struct Route53Provider {
    client: aws_sdk_route53::Client,
    runtime: Runtime,
}

/// Configuration object for a [`Route53Provider`]. Must be supplied when creating a provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Route53ProviderConfig<'a> {
    /// Named profile from the shared AWS config files. Uses the default chain if unset
    pub profile: Option<&'a str>,
    /// Region to send requests to. Falls back to the environment, then to us-east-1
    pub region: Option<&'a str>,
}

impl Route53Provider {
    pub fn from_config(config: &Route53ProviderConfig) -> Result<Route53Provider, ProviderError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ProviderError::from(format!("could not start runtime: {}", e)))?;

        let region = RegionProviderChain::first_try(config.region.map(|r| Region::new(r.to_owned())))
            .or_default_provider()
            .or_else(Region::new(DEFAULT_REGION));
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .timeout_config(
                TimeoutConfig::builder()
                    .connect_timeout(API_TIMEOUT)
                    .operation_timeout(API_TIMEOUT)
                    .build(),
            );
        if let Some(profile) = config.profile {
            loader = loader.profile_name(profile);
        }
        let sdk_config = runtime.block_on(loader.load());
        debug!(
            "Route53 client configured for region {:?}",
            sdk_config.region()
        );

        Ok(Route53Provider {
            client: aws_sdk_route53::Client::new(&sdk_config),
            runtime,
        })
    }
}

impl Route53Api for Route53Provider {
    fn list_zones_page(
        &self,
        max_items: u32,
        cursor: Option<ZoneCursor>,
    ) -> Result<Page<HostedZone, ZoneCursor>, ProviderError> {
        let (dns_name, zone_id) = match cursor {
            Some(c) => (Some(c.dns_name), Some(c.zone_id)),
            None => (None, None),
        };
        let response = self.runtime.block_on(
            self.client
                .list_hosted_zones_by_name()
                .max_items(max_items as i32)
                .set_dns_name(dns_name)
                .set_hosted_zone_id(zone_id)
                .send(),
        )?;

        let items = response
            .hosted_zones
            .iter()
            .map(HostedZone::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let next = match (response.next_dns_name, response.next_hosted_zone_id) {
            (Some(dns_name), Some(zone_id)) => Some(ZoneCursor { dns_name, zone_id }),
            _ => None,
        };
        trace!("Listed {} zone(s)", items.len());
        Ok(Page {
            items,
            is_truncated: response.is_truncated,
            next,
        })
    }

    fn list_rrsets_page(
        &self,
        zone_id: &str,
        max_items: u32,
        cursor: Option<RecordCursor>,
    ) -> Result<Page<ResourceRecordSet, RecordCursor>, ProviderError> {
        let mut request = self
            .client
            .list_resource_record_sets()
            .hosted_zone_id(zone_id)
            .max_items(max_items as i32);
        if let Some(c) = cursor {
            request = request
                .start_record_name(c.name)
                .start_record_type(sdk::RrType::from(c.rr_type.as_str()))
                .set_start_record_identifier(c.identifier);
        }
        let response = self.runtime.block_on(request.send())?;

        let items = response
            .resource_record_sets
            .iter()
            .map(ResourceRecordSet::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let next = match (response.next_record_name, response.next_record_type) {
            (Some(name), Some(rr_type)) => Some(RecordCursor {
                name,
                rr_type: rr_type.as_str().to_owned(),
                identifier: response.next_record_identifier,
            }),
            _ => None,
        };
        trace!("Listed {} record set(s) in {}", items.len(), zone_id);
        Ok(Page {
            items,
            is_truncated: response.is_truncated,
            next,
        })
    }

    fn create_hosted_zone(
        &self,
        request: &CreateZoneRequest,
    ) -> Result<CreatedZone, ProviderError> {
        let vpc = request.vpc.as_ref().map(|v| {
            sdk::Vpc::builder()
                .vpc_region(sdk::VpcRegion::from(v.region.as_str()))
                .vpc_id(&v.id)
                .build()
        });
        let zone_config = if vpc.is_some() || request.comment.is_some() {
            Some(
                sdk::HostedZoneConfig::builder()
                    .set_comment(request.comment.to_owned())
                    .private_zone(vpc.is_some())
                    .build(),
            )
        } else {
            None
        };

        let response = self.runtime.block_on(
            self.client
                .create_hosted_zone()
                .name(request.name.to_string())
                .caller_reference(&request.caller_reference)
                .set_vpc(vpc)
                .set_hosted_zone_config(zone_config)
                .send(),
        )?;

        let hosted_zone = response
            .hosted_zone
            .ok_or_else(|| ProviderError::from("response is missing the hosted zone".to_string()))?;
        let change = response
            .change_info
            .as_ref()
            .map(ChangeInfo::from)
            .ok_or_else(|| ProviderError::from("response is missing the change info".to_string()))?;
        // Private zones have no public delegation set
        let nameservers = response
            .delegation_set
            .map(|d| d.name_servers)
            .unwrap_or_default();

        Ok(CreatedZone {
            zone: Zone::new(
                parse_name(&hosted_zone.name)?,
                hosted_zone.id,
                nameservers,
                request.caller_reference.to_owned(),
                change.status,
            ),
            change,
        })
    }

    fn change_rrsets(&self, zone_id: &str, batch: &ChangeBatch) -> Result<ChangeInfo, ProviderError> {
        let changes = batch
            .snapshot()
            .ok_or_else(|| ProviderError::from("refusing to submit an empty change batch".to_string()))?
            .iter()
            .map(to_sdk_change)
            .collect::<Result<Vec<_>, _>>()?;
        let change_batch = sdk::ChangeBatch::builder()
            .set_changes(Some(changes))
            .set_comment(batch.comment().map(str::to_owned))
            .build()?;

        let response = self.runtime.block_on(
            self.client
                .change_resource_record_sets()
                .hosted_zone_id(zone_id)
                .change_batch(change_batch)
                .send(),
        )?;
        response
            .change_info
            .as_ref()
            .map(ChangeInfo::from)
            .ok_or_else(|| ProviderError::from("response is missing the change info".to_string()))
    }

    fn delete_hosted_zone(&self, zone_id: &str) -> Result<Option<ChangeInfo>, ProviderError> {
        let response = self
            .runtime
            .block_on(self.client.delete_hosted_zone().id(zone_id).send())?;
        Ok(response.change_info.as_ref().map(ChangeInfo::from))
    }

    fn get_change(&self, change_id: &str) -> Result<ChangeInfo, ProviderError> {
        let response = self
            .runtime
            .block_on(self.client.get_change().id(change_id).send())?;
        let change = response
            .change_info
            .as_ref()
            .map(ChangeInfo::from)
            .ok_or_else(|| ProviderError::from("response is missing the change info".to_string()))?;
        if change.status == ChangeStatus::Pending {
            trace!("Change {} pending", change_id);
        }
        Ok(change)
    }

    fn get_hosted_zone(&self, zone_id: &str) -> Result<ZoneDetails, ProviderError> {
        let response = self
            .runtime
            .block_on(self.client.get_hosted_zone().id(zone_id).send())?;

        let zone = response
            .hosted_zone
            .as_ref()
            .ok_or_else(|| ProviderError::from("response is missing the hosted zone".to_string()))
            .and_then(HostedZone::try_from)?;
        let vpcs = convert_vpcs(response.vpcs.as_deref().unwrap_or_default())?;
        Ok(ZoneDetails {
            zone,
            nameservers: response
                .delegation_set
                .map(|d| d.name_servers)
                .unwrap_or_default(),
            vpcs,
        })
    }

    fn test_dns_answer(
        &self,
        zone_id: &str,
        name: &DomainName,
        rr_type: &str,
    ) -> Result<DnsAnswer, ProviderError> {
        let response = self.runtime.block_on(
            self.client
                .test_dns_answer()
                .hosted_zone_id(zone_id)
                .record_name(name.to_string())
                .record_type(sdk::RrType::from(rr_type))
                .send(),
        )?;
        Ok(DnsAnswer {
            nameserver: response.nameserver,
            record_name: response.record_name,
            record_type: response.record_type.as_str().to_owned(),
            record_data: response.record_data,
            response_code: response.response_code,
            protocol: response.protocol,
        })
    }
}
