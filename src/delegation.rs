//! Parent/child relationships within a set of zones.
//!
//! When several zones of one hierarchy are hosted together, each zone has to be delegated from
//! its closest ancestor in the set (not from the topmost one), otherwise resolvers following
//! referrals would skip the intermediate zones.

use std::collections::HashMap;

use log::trace;

use crate::name::DomainName;

/// `parent` must contain an NS record set named after `child`, pointing to its nameservers
#[derive(Debug, PartialEq, Eq)]
pub struct Delegation<'a, Z> {
    pub parent: &'a Z,
    pub child: &'a Z,
}

// Manual impls, derive would require Z: Clone
impl<Z> Clone for Delegation<'_, Z> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<Z> Copy for Delegation<'_, Z> {}

/// Compute the delegations needed among `zones`.
///
/// For every zone, its ancestors are visited from the closest upwards and the first one that
/// is part of `zones` becomes its parent. Zones without an ancestor in the set get no
/// delegation. Output order follows input order. If a name appears more than once, the first
/// occurrence acts as parent.
pub fn compute_delegations<Z: AsRef<DomainName>>(zones: &[Z]) -> Vec<Delegation<'_, Z>> {
    let mut by_name: HashMap<&DomainName, &Z> = HashMap::with_capacity(zones.len());
    for zone in zones {
        by_name.entry(zone.as_ref()).or_insert(zone);
    }

    zones
        .iter()
        .filter_map(|child| {
            let parent = child
                .as_ref()
                .ancestors()
                .find_map(|ancestor| by_name.get(&ancestor).copied())?;
            trace!(
                "Delegation needed: {} -> {}",
                parent.as_ref(),
                child.as_ref()
            );
            Some(Delegation { parent, child })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn names(list: &[&str]) -> Vec<DomainName> {
        list.iter().map(|n| n.parse().unwrap()).collect()
    }

    fn pairs(zones: &[DomainName]) -> HashSet<(String, String)> {
        compute_delegations(zones)
            .iter()
            .map(|d| (d.parent.to_string(), d.child.to_string()))
            .collect()
    }

    #[test]
    fn should_delegate_to_existing_parent_only() {
        let zones = names(&["example.com.", "sub.example.com.", "other.test."]);
        let delegations = compute_delegations(&zones);

        assert_eq!(delegations.len(), 1);
        assert_eq!(delegations[0].parent.to_string(), "example.com.");
        assert_eq!(delegations[0].child.to_string(), "sub.example.com.");
    }

    #[test]
    fn should_pick_closest_ancestor() {
        let zones = names(&["a.b.c.example.", "example.", "c.example."]);
        let delegations = compute_delegations(&zones);

        assert_eq!(delegations.len(), 2);
        assert_eq!(delegations[0].parent.to_string(), "c.example.");
        assert_eq!(delegations[0].child.to_string(), "a.b.c.example.");
        assert_eq!(delegations[1].parent.to_string(), "example.");
        assert_eq!(delegations[1].child.to_string(), "c.example.");
    }

    #[test]
    fn should_never_self_delegate() {
        let zones = names(&["example.com.", "Example.COM"]);
        for d in compute_delegations(&zones) {
            assert_ne!(d.parent.to_string(), d.child.to_string());
        }
        assert!(pairs(&names(&["example.com."])).is_empty());
    }

    #[test]
    fn should_match_names_case_insensitively() {
        let zones = names(&["EXAMPLE.com.", "www.example.COM."]);
        let p = pairs(&zones);
        assert_eq!(
            p,
            HashSet::from([("EXAMPLE.com.".to_string(), "www.example.COM.".to_string())])
        );
    }

    #[test]
    fn should_be_order_independent() {
        let zones = names(&[
            "org.",
            "example.org.",
            "a.example.org.",
            "x.y.a.example.org.",
            "b.example.org.",
            "unrelated.net.",
        ]);
        let expected = pairs(&zones);
        let pair = |p: &str, c: &str| (p.to_string(), c.to_string());
        assert_eq!(
            expected,
            HashSet::from([
                pair("org.", "example.org."),
                pair("example.org.", "a.example.org."),
                pair("a.example.org.", "x.y.a.example.org."),
                pair("example.org.", "b.example.org."),
            ])
        );

        let mut reversed = zones.clone();
        reversed.reverse();
        assert_eq!(pairs(&reversed), expected);

        let mut rotated = zones.clone();
        rotated.rotate_left(2);
        assert_eq!(pairs(&rotated), expected);
        assert_eq!(pairs(&zones), expected);
    }

    #[test]
    fn should_emit_at_most_one_delegation_per_zone() {
        let zones = names(&["com.", "example.com.", "www.example.com.", "."]);
        let delegations = compute_delegations(&zones);
        let children: HashSet<_> = delegations.iter().map(|d| d.child.to_string()).collect();
        assert_eq!(children.len(), delegations.len());
        // The root zone is an ancestor of everything else in the set
        assert_eq!(delegations.len(), 3);
    }

    #[test]
    fn should_work_on_empty_input() {
        let zones: Vec<DomainName> = Vec::new();
        assert!(compute_delegations(&zones).is_empty());
    }
}
