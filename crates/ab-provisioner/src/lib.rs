//! Audience Broker Provisioner
//!
//! The create and delete audience pipelines, built on the directory facade,
//! and the invocation handlers the lambdas call.

mod create;
mod delete;
mod error;
mod handler;
mod pipeline;

pub use create::{CreateAudienceUseCase, CreatedAudience};
pub use delete::DeleteAudienceUseCase;
pub use error::{ProvisionError, ProvisionResult};
pub use handler::AudienceHandler;
pub use pipeline::{PipelineState, PipelineTracker};
