//! Main crate for the `r53utils` application.
//!
//! A small library for managing Amazon Route53 hosted zones: listing zones and record sets,
//! creating and deleting zones, waiting for changes to propagate and setting up delegations
//! between parent and child zones hosted in the same account.
//!
//! The following modules might be of interest if you want to add new functionality:
//! - [`provider`] defines the [`provider::Route53Api`] trait through which all remote calls go
//! - [`zone`] implements the zone lifecycle on top of any [`provider::Route53Api`]
//! - [`delegation`] computes which zones need to be delegated from which parent
//! - [`bulk`] runs creations and deletions over several zones

#![allow(clippy::uninlined_format_args)]

pub mod bulk;
pub mod cancel;
pub mod changes;
pub mod config;
pub mod delegation;
pub mod error;
pub mod name;
pub mod pager;
pub mod present;
pub mod provider;
pub mod types;
pub mod zone;

pub use error::R53Error;
pub use name::DomainName;
