//! Human readable renderings of zones and record sets.

use itertools::Itertools;

use crate::types::{DnsAnswer, HostedZone, ResourceRecordSet, Zone};

/// One line per value: `<name> <ttl> IN <type> <value>`, in stored order.
///
/// Alias record sets have no values and render as a single `ALIAS <target>` line.
pub fn rrset_to_text(rrset: &ResourceRecordSet) -> String {
    if let Some(alias) = &rrset.alias_target {
        return format!(
            "{} {} IN {} ALIAS {}",
            rrset.name, rrset.ttl, rrset.rr_type, alias.dns_name
        );
    }
    rrset
        .values
        .iter()
        .map(|value| {
            format!(
                "{} {} IN {} {}",
                rrset.name, rrset.ttl, rrset.rr_type, value
            )
        })
        .join("\n")
}

/// `<name> <id> <private|public> <record count>`
pub fn zone_summary(zone: &HostedZone) -> String {
    format!(
        "{} {} {} {}",
        zone.name,
        zone.id,
        if zone.private { "private" } else { "public" },
        zone.record_count
    )
}

/// Zone header followed by its nameservers, one per line
pub fn zone_info(zone: &Zone) -> String {
    let mut out = format!("<Zone: {} Id: {}>\nNameservers:", zone.name, zone.id);
    for ns in &zone.nameservers {
        out.push_str("\n\t");
        out.push_str(ns);
    }
    out
}

pub fn dns_answer_to_text(answer: &DnsAnswer) -> String {
    let mut lines = vec![
        format!("Nameserver: {}", answer.nameserver),
        format!("Protocol: {}", answer.protocol),
        format!("Response code: {}", answer.response_code),
    ];
    lines.extend(answer.record_data.iter().map(|data| {
        format!(
            "{} IN {} {}",
            answer.record_name, answer.record_type, data
        )
    }));
    lines.join("\n")
}
