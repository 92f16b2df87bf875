//! Integration tests for matchbox-dropbox
//!
//! Uses wiremock to simulate the Dropbox API and verifies end-to-end
//! behavior of listings, thumbnails, token revocation and the provider's
//! error classification.

mod common;

mod test_listing;
mod test_provider;
mod test_thumbnail_revoke;
