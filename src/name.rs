//! Absolute DNS names as used by Route53.
//!
//! Route53 always reports names in fully qualified form (`example.com.`) and writes every
//! byte outside `a-z0-9-_` as a three-digit octal escape (`\052` for `*`). Every name
//! entering the crate goes through the same parser, so names from the provider and names
//! typed by a user compare equal.

use std::{
    cmp::Ordering,
    fmt::Display,
    hash::{Hash, Hasher},
    str::FromStr,
};

use hickory_proto::rr::{LowerName, Name};
use serde::{Serialize, Serializer};
use thiserror::Error;

const MAX_LABEL_LEN: usize = 63;
// Wire format: one length octet per label, the label itself and the root octet
const MAX_WIRE_LEN: usize = 255;

/// A fully qualified domain name.
///
/// Comparison, hashing and ordering are case-insensitive. Ordering follows the canonical DNS
/// order, i.e. labels are compared starting from the TLD.
/// The spelling a name was parsed from is kept for display purposes.
#[derive(Debug, Clone)]
pub struct DomainName {
    name: Name,
    lower: LowerName,
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum NameError {
    #[error("domain name is empty")]
    Empty,
    #[error("domain name `{0}` contains an empty label")]
    EmptyLabel(String),
    #[error("label `{label}` in domain name `{name}` is longer than 63 octets")]
    LabelTooLong { name: String, label: String },
    #[error("domain name `{0}` is longer than 255 octets")]
    NameTooLong(String),
    #[error("domain name `{0}` contains an invalid escape sequence")]
    BadEscape(String),
    #[error("invalid domain name `{name}`: {reason}")]
    Invalid { name: String, reason: String },
}

impl DomainName {
    /// The DNS root, `.`
    pub fn root() -> Self {
        Name::root().into()
    }

    pub fn is_root(&self) -> bool {
        self.label_count() == 0
    }

    /// Returns the name with its leftmost label removed, or [`None`] for the root
    pub fn parent(&self) -> Option<DomainName> {
        if self.is_root() {
            return None;
        }
        Some(self.name.base_name().into())
    }

    /// Iterates over the proper ancestors of this name, closest first and ending with the root
    pub fn ancestors(&self) -> impl Iterator<Item = DomainName> {
        std::iter::successors(self.parent(), |n| n.parent())
    }

    pub fn label_count(&self) -> usize {
        // num_labels() does not count a leading wildcard
        self.name.iter().count()
    }

    /// Whether `self` is `other` or lies below it
    pub fn ends_with(&self, other: &DomainName) -> bool {
        other.lower.zone_of(&self.lower)
    }
}

impl From<Name> for DomainName {
    fn from(mut name: Name) -> Self {
        name.set_fqdn(true);
        let lower = LowerName::new(&name);
        DomainName { name, lower }
    }
}

// Splits a name in presentation format into raw labels. `\NNN` is an octal byte value,
// `\X` stands for X itself.
fn split_labels(s: &str) -> Result<Vec<Vec<u8>>, NameError> {
    let bytes = s.as_bytes();
    let mut labels = Vec::new();
    let mut label = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                let digits = bytes
                    .get(i + 1..i + 4)
                    .filter(|d| d.iter().all(|b| (b'0'..=b'7').contains(b)));
                match (digits, bytes.get(i + 1)) {
                    (Some(d), _) => {
                        let value = d
                            .iter()
                            .fold(0u32, |acc, b| acc * 8 + u32::from(b - b'0'));
                        let byte = u8::try_from(value)
                            .map_err(|_| NameError::BadEscape(s.to_owned()))?;
                        label.push(byte);
                        i += 4;
                    }
                    (None, Some(c)) if !c.is_ascii_digit() => {
                        label.push(*c);
                        i += 2;
                    }
                    _ => return Err(NameError::BadEscape(s.to_owned())),
                }
            }
            b'.' => {
                if label.is_empty() {
                    return Err(NameError::EmptyLabel(s.to_owned()));
                }
                labels.push(std::mem::take(&mut label));
                i += 1;
            }
            b => {
                label.push(b);
                i += 1;
            }
        }
    }
    // No trailing dot
    if !label.is_empty() {
        labels.push(label);
    }
    Ok(labels)
}

impl FromStr for DomainName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(NameError::Empty);
        }
        if s == "." {
            return Ok(DomainName::root());
        }

        let labels = split_labels(s)?;
        if let Some(label) = labels.iter().find(|l| l.len() > MAX_LABEL_LEN) {
            return Err(NameError::LabelTooLong {
                name: s.to_owned(),
                label: String::from_utf8_lossy(label).into_owned(),
            });
        }
        let wire_len = labels.iter().map(|l| l.len() + 1).sum::<usize>() + 1;
        if wire_len > MAX_WIRE_LEN {
            return Err(NameError::NameTooLong(s.to_owned()));
        }

        Name::from_labels(labels)
            .map(DomainName::from)
            .map_err(|e| NameError::Invalid {
                name: s.to_owned(),
                reason: e.to_string(),
            })
    }
}

impl TryFrom<&str> for DomainName {
    type Error = NameError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl TryFrom<String> for DomainName {
    type Error = NameError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl Display for DomainName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Display on Name would turn punycode labels into unicode
        f.write_str(&self.name.to_ascii())
    }
}

impl PartialEq for DomainName {
    fn eq(&self, other: &Self) -> bool {
        self.lower == other.lower
    }
}
impl Eq for DomainName {}

impl Hash for DomainName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lower.hash(state);
    }
}

impl Ord for DomainName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.lower.cmp(&other.lower)
    }
}
impl PartialOrd for DomainName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl AsRef<DomainName> for DomainName {
    fn as_ref(&self) -> &DomainName {
        self
    }
}

impl Serialize for DomainName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn name(s: &str) -> DomainName {
        s.parse().unwrap()
    }

    #[test]
    fn should_append_root_label() {
        assert_eq!(name("example.com").to_string(), "example.com.");
        assert_eq!(name("example.com."), name("example.com"));
        assert_eq!(name(".").to_string(), ".");
    }

    #[test]
    fn should_compare_case_insensitive() {
        assert_eq!(name("WWW.Example.COM."), name("www.example.com."));

        let mut set = HashSet::new();
        set.insert(name("Example.com"));
        assert!(set.contains(&name("example.COM.")));
    }

    #[test]
    fn should_keep_spelling_for_display() {
        assert_eq!(name("WWW.Example.com").to_string(), "WWW.Example.com.");
    }

    #[test]
    fn should_decode_octal_escapes() {
        let wildcard = name("\\052.example.com.");
        assert_eq!(wildcard, name("*.example.com"));
        assert_eq!(wildcard.to_string(), "*.example.com.");
        assert_eq!(wildcard.label_count(), 3);
        assert_eq!(wildcard.parent(), Some(name("example.com.")));
    }

    #[test]
    fn should_keep_escaped_dot_inside_label() {
        let n = name("a\\.b.example.com.");
        assert_eq!(n.label_count(), 3);
        assert_eq!(n.parent(), Some(name("example.com.")));
    }

    #[test]
    fn should_reject_bad_escapes() {
        assert!(matches!(
            "a\\9.example.com".parse::<DomainName>(),
            Err(NameError::BadEscape(_))
        ));
        assert!(matches!(
            "\\400.example.com".parse::<DomainName>(),
            Err(NameError::BadEscape(_))
        ));
        assert!(matches!(
            "example.com\\".parse::<DomainName>(),
            Err(NameError::BadEscape(_))
        ));
    }

    #[test]
    fn should_keep_punycode_labels() {
        assert_eq!(
            name("xn--bcher-kva.example.").to_string(),
            "xn--bcher-kva.example."
        );
    }

    #[test]
    fn should_walk_to_root() {
        let n = name("a.b.example.com.");
        assert_eq!(n.parent(), Some(name("b.example.com.")));
        let ancestors: Vec<_> = n.ancestors().map(|a| a.to_string()).collect();
        assert_eq!(
            ancestors,
            vec!["b.example.com.", "example.com.", "com.", "."]
        );
        assert_eq!(DomainName::root().parent(), None);
    }

    #[test]
    fn should_reject_malformed_names() {
        assert_eq!("".parse::<DomainName>(), Err(NameError::Empty));
        assert!(matches!(
            "a..example.com".parse::<DomainName>(),
            Err(NameError::EmptyLabel(_))
        ));
        let long_label = format!("{}.com", "x".repeat(64));
        assert!(matches!(
            long_label.parse::<DomainName>(),
            Err(NameError::LabelTooLong { .. })
        ));
    }

    #[test]
    fn should_limit_wire_length() {
        let label = "x".repeat(63);
        // 4 + 63 * 3 + 61 + 1 = 255 octets on the wire
        let longest = format!("{0}.{0}.{0}.{1}", label, "y".repeat(61));
        assert!(longest.parse::<DomainName>().is_ok());

        let too_long = format!("{0}.{0}.{0}.{1}", label, "y".repeat(62));
        assert_eq!(too_long.len(), 254);
        assert!(matches!(
            too_long.parse::<DomainName>(),
            Err(NameError::NameTooLong(_))
        ));
    }

    #[test]
    fn should_order_canonically() {
        let mut names = vec![name("z.a.test."), name("b.test."), name("a.test.")];
        names.sort();
        assert_eq!(
            names,
            vec![name("a.test."), name("z.a.test."), name("b.test.")]
        );
    }

    #[test]
    fn should_detect_subdomains() {
        assert!(name("www.example.com.").ends_with(&name("example.com.")));
        assert!(name("WWW.example.com.").ends_with(&name("Example.com.")));
        assert!(name("example.com.").ends_with(&name("example.com.")));
        assert!(!name("badexample.com.").ends_with(&name("example.com.")));
        assert!(name("example.com.").ends_with(&DomainName::root()));
    }
}
