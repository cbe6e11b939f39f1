//! Session state shared by every step of a workflow run.
//!
//! This module provides:
//! - The session context (cookie jar, transport, logger, current response)
//! - The response contract and the completion signal derived from it
//! - Login credentials

mod credentials;
mod response;
mod session;

pub use credentials::Credentials;
pub use response::{ResponseBase, WorkflowResponse, WorkflowSignal};
pub use session::{generate_execution_id, SessionContext, START_STEP};
