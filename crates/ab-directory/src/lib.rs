//! Audience Broker Directory
//!
//! Facade over the Microsoft Graph application and service principal API.
//!
//! Layers:
//! - [`GraphApi`]: one method per Graph call ([`GraphClient`] over HTTP,
//!   [`InMemoryGraph`] for tests and local runs)
//! - [`DirectoryClient`]: the operations the pipelines use, with explicit
//!   none / one / several classification of lookups
//! - [`DirectoryConnector`]: client-credentials authentication producing a
//!   `DirectoryClient`

mod api;
mod auth;
mod connector;
mod error;
mod facade;
mod graph_client;
mod memory;
mod model;

pub use api::GraphApi;
pub use auth::TokenProvider;
pub use connector::{DirectoryConnector, GraphConnector, StaticConnector};
pub use error::{CreateStep, DirectoryError, DirectoryResult, EntityKind};
pub use facade::{DirectoryClient, SEARCH_RESULT_CAP};
pub use graph_client::{odata_quote, GraphClient};
pub use memory::{GraphOperation, InMemoryGraph};
pub use model::{
    Application, Cardinality, CreatedApplication, Credentials, DeletedApplication,
    ServicePrincipal,
};
