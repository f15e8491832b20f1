// Catalog service module.
// Client, token issuance, and types for the program catalog REST API.

pub mod client;
pub mod endpoints;
pub mod factory;
pub mod token;
pub mod types;

use crate::error::Result;
use crate::sites::Site;

pub use client::CatalogClient;
pub use factory::CatalogClientFactory;
pub use token::TokenIssuer;
pub use types::{ProgramDocument, program_status, program_title};

/// Program queries the refresh job needs from the catalog.
#[allow(async_fn_in_trait)]
pub trait CatalogApi {
    /// UUIDs of all active and retired programs, in catalog order.
    async fn program_uuids(&mut self) -> Result<Vec<String>>;

    /// Full detail document for one program, as returned.
    async fn program(&mut self, uuid: &str) -> Result<ProgramDocument>;
}

/// Constructs catalog clients for a service account and optional site.
pub trait ClientFactory {
    type Client: CatalogApi;

    fn build_client(&self, username: &str, site: Option<&Site>) -> Result<Self::Client>;
}
