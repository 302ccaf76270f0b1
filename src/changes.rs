//! Accumulation of record set changes for atomic submission.

use std::fmt::Display;

use log::trace;

use crate::{name::DomainName, types::ResourceRecordSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeAction {
    Create,
    Upsert,
    Delete,
}
impl Display for ChangeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeAction::Create => write!(f, "CREATE"),
            ChangeAction::Upsert => write!(f, "UPSERT"),
            ChangeAction::Delete => write!(f, "DELETE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Change {
    pub action: ChangeAction,
    pub rrset: ResourceRecordSet,
}
impl Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.action, self.rrset.name, self.rrset.rr_type
        )
    }
}

/// An ordered list of changes that the provider applies all-or-nothing.
///
/// The builder performs no semantic validation, the provider rejects invalid batches on
/// submission. An empty batch must never be submitted, use [`ChangeBatch::snapshot()`] to check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeBatch {
    changes: Vec<Change>,
    comment: Option<String>,
}

impl ChangeBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_comment(comment: &str) -> Self {
        ChangeBatch {
            changes: Vec::new(),
            comment: Some(comment.to_owned()),
        }
    }

    pub fn create(&mut self, name: DomainName, rr_type: &str, ttl: u32, values: Vec<String>) {
        self.push(
            ChangeAction::Create,
            ResourceRecordSet::new(name, rr_type, ttl, values),
        );
    }

    pub fn upsert(&mut self, name: DomainName, rr_type: &str, ttl: u32, values: Vec<String>) {
        self.push(
            ChangeAction::Upsert,
            ResourceRecordSet::new(name, rr_type, ttl, values),
        );
    }

    /// Delete an existing record set. It has to match the remote set exactly,
    /// so pass it on as it was listed
    pub fn delete(&mut self, existing: ResourceRecordSet) {
        self.push(ChangeAction::Delete, existing);
    }

    fn push(&mut self, action: ChangeAction, rrset: ResourceRecordSet) {
        let change = Change { action, rrset };
        trace!("Adding change {}", change);
        self.changes.push(change);
    }

    /// The accumulated changes, or [`None`] if there is nothing to submit
    pub fn snapshot(&self) -> Option<&[Change]> {
        if self.changes.is_empty() {
            None
        } else {
            Some(&self.changes)
        }
    }

    /// Drop all accumulated changes so the builder can be reused
    pub fn reset(&mut self) {
        self.changes.clear();
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> DomainName {
        s.parse().unwrap()
    }

    #[test]
    fn should_start_empty() {
        let batch = ChangeBatch::new();
        assert!(batch.snapshot().is_none());
        assert!(batch.is_empty());
    }

    #[test]
    fn should_record_create() {
        let mut batch = ChangeBatch::new();
        batch.create(
            name("test.example.com."),
            "A",
            300,
            vec!["192.0.2.1".to_string()],
        );

        let changes = batch.snapshot().unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].action, ChangeAction::Create);
        assert_eq!(changes[0].rrset.values, vec!["192.0.2.1"]);
    }

    #[test]
    fn should_reset_to_empty() {
        let mut batch = ChangeBatch::new();
        batch.create(name("a.example.com."), "A", 300, vec!["192.0.2.1".into()]);
        batch.upsert(name("b.example.com."), "txt", 60, vec!["\"x\"".into()]);
        assert_eq!(batch.len(), 2);

        batch.reset();
        assert!(batch.snapshot().is_none());

        batch.upsert(name("b.example.com."), "txt", 60, vec!["\"x\"".into()]);
        let changes = batch.snapshot().unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].action, ChangeAction::Upsert);
        assert_eq!(changes[0].rrset.rr_type, "TXT");
    }

    #[test]
    fn should_delete_given_set_unchanged() {
        let mut existing =
            ResourceRecordSet::new(name("w.example.com."), "A", 60, vec!["192.0.2.9".into()]);
        existing.set_identifier = Some("blue".to_string());

        let mut batch = ChangeBatch::with_comment("cleanup");
        batch.delete(existing.clone());

        let changes = batch.snapshot().unwrap();
        assert_eq!(changes[0].action, ChangeAction::Delete);
        assert_eq!(changes[0].rrset, existing);
        assert_eq!(batch.comment(), Some("cleanup"));
    }
}
