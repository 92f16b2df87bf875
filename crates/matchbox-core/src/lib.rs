//! Matchbox Core - Domain types and ports
//!
//! This crate contains the hexagonal core of the Dropbox browser:
//! - **Domain entities** - `DirectoryEntry`, `PaginationState`, `StoredCredential`
//! - **Port definitions** - Traits for adapters: `IListingProvider`,
//!   `IBrowseRepository`, `ITokenStore`
//! - **Configuration** - YAML-backed settings shared by every front end
//!
//! # Architecture
//!
//! The domain module contains pure value types with no I/O. Ports define the
//! trait interfaces that the cache, Dropbox and sync crates implement or
//! consume. Nothing in here owns a process-wide singleton; every service is
//! constructed explicitly and injected.

pub mod config;
pub mod domain;
pub mod ports;
