//! One module per message body. [`crate::message::Message`] assembles
//! these into the closed sum type a caller actually encodes/decodes.

pub mod auth;
pub mod batch_message;
pub mod error_message;
pub mod event;
pub mod execute;
pub mod prepare;
pub mod query;
pub mod register;
pub mod result;
pub mod revise;
pub mod startup;
pub mod supported;

pub use auth::{AuthChallenge, AuthResponse, AuthSuccess, Authenticate};
pub use batch_message::BatchMessage;
pub use error_message::{ErrorDetail, ErrorMessage, FailureDetail};
pub use event::EventPayload;
pub use execute::Execute;
pub use prepare::Prepare;
pub use query::Query;
pub use register::Register;
pub use result::{ResultPayload, Row};
pub use revise::Revise;
pub use startup::Startup;
pub use supported::Supported;
