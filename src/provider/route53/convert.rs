use aws_sdk_route53::{
    error::{BuildError, DisplayErrorContext, ProvideErrorMetadata, SdkError},
    types as sdk,
};
use chrono::{DateTime, Utc};

use crate::{
    changes::{Change, ChangeAction},
    name::DomainName,
    provider::ProviderError,
    types::{AliasTarget, ChangeInfo, ChangeStatus, HostedZone, ResourceRecordSet, Vpc},
};

impl<E, R> From<SdkError<E, R>> for ProviderError
where
    E: std::error::Error + ProvideErrorMetadata + 'static,
    R: std::fmt::Debug,
{
    fn from(e: SdkError<E, R>) -> Self {
        ProviderError::new(
            e.code().map(str::to_owned),
            DisplayErrorContext(&e).to_string(),
        )
    }
}

impl From<BuildError> for ProviderError {
    fn from(e: BuildError) -> Self {
        ProviderError::new(None, format!("invalid request: {}", e))
    }
}

pub(super) fn parse_name(name: &str) -> Result<DomainName, ProviderError> {
    name.parse()
        .map_err(|e| ProviderError::from(format!("provider returned invalid name: {}", e)))
}

fn convert_time(t: &aws_sdk_route53::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(t.secs(), t.subsec_nanos())
}

impl From<&sdk::ChangeInfo> for ChangeInfo {
    fn from(c: &sdk::ChangeInfo) -> Self {
        ChangeInfo {
            id: c.id.to_owned(),
            status: match c.status {
                sdk::ChangeStatus::Insync => ChangeStatus::InSync,
                _ => ChangeStatus::Pending,
            },
            submitted_at: convert_time(&c.submitted_at),
        }
    }
}

impl TryFrom<&sdk::HostedZone> for HostedZone {
    type Error = ProviderError;

    fn try_from(z: &sdk::HostedZone) -> Result<Self, Self::Error> {
        Ok(HostedZone {
            id: z.id.to_owned(),
            name: parse_name(&z.name)?,
            caller_reference: z.caller_reference.to_owned(),
            private: z.config.as_ref().is_some_and(|c| c.private_zone),
            record_count: z
                .resource_record_set_count
                .and_then(|c| u64::try_from(c).ok())
                .unwrap_or(0),
            comment: z.config.as_ref().and_then(|c| c.comment.to_owned()),
        })
    }
}

impl TryFrom<&sdk::Vpc> for Vpc {
    type Error = ProviderError;

    fn try_from(v: &sdk::Vpc) -> Result<Self, Self::Error> {
        match (&v.vpc_region, &v.vpc_id) {
            (Some(region), Some(id)) => Ok(Vpc {
                region: region.as_str().to_owned(),
                id: id.to_owned(),
            }),
            _ => Err(format!("incomplete VPC association: {:?}", v).into()),
        }
    }
}

/// VPC associations of a private zone, as listed by `GetHostedZone`
pub(super) fn convert_vpcs(vpcs: &[sdk::Vpc]) -> Result<Vec<Vpc>, ProviderError> {
    vpcs.iter().map(Vpc::try_from).collect()
}

impl TryFrom<&sdk::ResourceRecordSet> for ResourceRecordSet {
    type Error = ProviderError;

    fn try_from(r: &sdk::ResourceRecordSet) -> Result<Self, Self::Error> {
        let ttl = match r.ttl {
            Some(ttl) => u32::try_from(ttl)
                .map_err(|_| ProviderError::from(format!("invalid TTL {} on {}", ttl, r.name)))?,
            // Alias record sets have no TTL of their own
            None => 0,
        };
        Ok(ResourceRecordSet {
            name: parse_name(&r.name)?,
            rr_type: r.r#type.as_str().to_owned(),
            ttl,
            values: r
                .resource_records
                .iter()
                .flatten()
                .map(|rr| rr.value.to_owned())
                .collect(),
            set_identifier: r.set_identifier.to_owned(),
            alias_target: r.alias_target.as_ref().map(|a| AliasTarget {
                hosted_zone_id: a.hosted_zone_id.to_owned(),
                dns_name: a.dns_name.to_owned(),
                evaluate_target_health: a.evaluate_target_health,
            }),
        })
    }
}

impl From<ChangeAction> for sdk::ChangeAction {
    fn from(a: ChangeAction) -> Self {
        match a {
            ChangeAction::Create => sdk::ChangeAction::Create,
            ChangeAction::Upsert => sdk::ChangeAction::Upsert,
            ChangeAction::Delete => sdk::ChangeAction::Delete,
        }
    }
}

pub(super) fn to_sdk_rrset(r: &ResourceRecordSet) -> Result<sdk::ResourceRecordSet, BuildError> {
    let mut builder = sdk::ResourceRecordSet::builder()
        .name(r.name.to_string())
        .r#type(sdk::RrType::from(r.rr_type.as_str()))
        .set_set_identifier(r.set_identifier.to_owned());

    match &r.alias_target {
        Some(alias) => {
            builder = builder.alias_target(
                sdk::AliasTarget::builder()
                    .hosted_zone_id(&alias.hosted_zone_id)
                    .dns_name(&alias.dns_name)
                    .evaluate_target_health(alias.evaluate_target_health)
                    .build()?,
            );
        }
        None => {
            builder = builder.ttl(i64::from(r.ttl));
            for value in &r.values {
                builder =
                    builder.resource_records(sdk::ResourceRecord::builder().value(value).build()?);
            }
        }
    }
    builder.build()
}

pub(super) fn to_sdk_change(c: &Change) -> Result<sdk::Change, BuildError> {
    sdk::Change::builder()
        .action(c.action.into())
        .resource_record_set(to_sdk_rrset(&c.rrset)?)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_record_set() {
        let sdk_rrset = sdk::ResourceRecordSet::builder()
            .name("www.example.com.")
            .r#type(sdk::RrType::A)
            .ttl(300)
            .resource_records(sdk::ResourceRecord::builder().value("192.0.2.1").build().unwrap())
            .resource_records(sdk::ResourceRecord::builder().value("192.0.2.2").build().unwrap())
            .build()
            .unwrap();

        let rrset = ResourceRecordSet::try_from(&sdk_rrset).unwrap();
        assert_eq!(rrset.name, "www.example.com.".parse().unwrap());
        assert_eq!(rrset.rr_type, "A");
        assert_eq!(rrset.ttl, 300);
        assert_eq!(rrset.values, vec!["192.0.2.1", "192.0.2.2"]);

        let back = to_sdk_rrset(&rrset).unwrap();
        assert_eq!(back, sdk_rrset);
    }

    #[test]
    fn should_submit_alias_without_ttl() {
        let sdk_rrset = sdk::ResourceRecordSet::builder()
            .name("example.com.")
            .r#type(sdk::RrType::A)
            .alias_target(
                sdk::AliasTarget::builder()
                    .hosted_zone_id("Z2FDTNDATAQYW2")
                    .dns_name("d111111abcdef8.cloudfront.net.")
                    .evaluate_target_health(false)
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();

        let rrset = ResourceRecordSet::try_from(&sdk_rrset).unwrap();
        assert!(rrset.values.is_empty());
        let back = to_sdk_rrset(&rrset).unwrap();
        assert_eq!(back.ttl, None);
        assert!(back.resource_records.is_none());
        assert_eq!(back, sdk_rrset);
    }

    #[test]
    fn should_reject_negative_ttl() {
        let sdk_rrset = sdk::ResourceRecordSet::builder()
            .name("www.example.com.")
            .r#type(sdk::RrType::A)
            .ttl(-1)
            .build()
            .unwrap();
        assert!(ResourceRecordSet::try_from(&sdk_rrset).is_err());
    }

    #[test]
    fn should_convert_change_status() {
        let info = sdk::ChangeInfo::builder()
            .id("/change/C1")
            .status(sdk::ChangeStatus::Insync)
            .submitted_at(aws_sdk_route53::primitives::DateTime::from_secs(1_584_576_353))
            .build()
            .unwrap();
        let converted = ChangeInfo::from(&info);
        assert_eq!(converted.status, ChangeStatus::InSync);
        assert_eq!(
            converted.submitted_at.map(|t| t.timestamp()),
            Some(1_584_576_353)
        );
    }

    #[test]
    fn should_convert_vpc_associations() {
        let vpcs = [
            sdk::Vpc::builder()
                .vpc_region(sdk::VpcRegion::UsWest2)
                .vpc_id("vpc-12345678")
                .build(),
            sdk::Vpc::builder()
                .vpc_region(sdk::VpcRegion::EuCentral1)
                .vpc_id("vpc-87654321")
                .build(),
        ];
        let converted = convert_vpcs(&vpcs).unwrap();
        assert_eq!(
            converted,
            vec![
                Vpc {
                    region: "us-west-2".to_string(),
                    id: "vpc-12345678".to_string(),
                },
                Vpc {
                    region: "eu-central-1".to_string(),
                    id: "vpc-87654321".to_string(),
                },
            ]
        );
        assert!(convert_vpcs(&[]).unwrap().is_empty());

        let incomplete = [sdk::Vpc::builder().vpc_id("vpc-1").build()];
        assert!(convert_vpcs(&incomplete).is_err());
    }

    #[test]
    fn should_detect_private_zone() {
        let zone = sdk::HostedZone::builder()
            .id("/hostedzone/Z1")
            .name("internal.test.")
            .caller_reference("r53utils.1")
            .config(sdk::HostedZoneConfig::builder().private_zone(true).build())
            .resource_record_set_count(3)
            .build()
            .unwrap();
        let converted = HostedZone::try_from(&zone).unwrap();
        assert!(converted.private);
        assert_eq!(converted.record_count, 3);
    }
}
