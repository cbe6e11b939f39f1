//! # Crawlflow
//!
//! A composite step engine for scripted, multi-step HTTP sessions.
//!
//! Crawlflow organizes an interaction with a remote web application (log in,
//! navigate, submit, read) as a tree of steps sharing one session:
//!
//! - **Composite steps**: register child steps that run in order, lazily built
//! - **Leaf steps**: perform one HTTP exchange with `before`/`after` hooks
//! - **Session context**: cookie jar, credentials, logger and transport shared
//!   by every step of a run
//! - **Early stop**: a finished response or a failed post-condition skips the
//!   rest of the tree
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use crawlflow::prelude::*;
//!
//! struct Login;
//!
//! impl Step<ResponseBase> for Login {
//!     fn request(&self) -> RequestSpec {
//!         RequestSpec::post().with_url("https://portal.example/login")
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Portal;
//!
//! impl Step<ResponseBase> for Portal {
//!     fn steps(&self, steps: &mut StepList<ResponseBase>) {
//!         steps.add(|| Login);
//!     }
//! }
//!
//! let runner = WorkflowRunner::from_config(WorkflowConfig::new("https://portal.example/"))?;
//! let response = runner.run(&mut Portal).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod context;
pub mod errors;
pub mod http;
pub mod observability;
pub mod steps;
pub mod testing;
pub mod workflow;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::context::{
        Credentials, ResponseBase, SessionContext, WorkflowResponse, WorkflowSignal,
    };
    pub use crate::errors::{CrawlError, DuplicateParameterError, StepConstructionError};
    pub use crate::http::{
        CookieJar, HeaderMap, HeaderValue, HttpMethod, HttpRequest, Parameters, RawBody,
        ReqwestTransport, RequestSpec, StepResponse, Transport, TransportConfig, TransportResponse,
    };
    pub use crate::observability::{init_tracing, LogLevel, Logger, TracingLogger};
    pub use crate::steps::{merge_cookies, start, Step, StepDescriptor, StepList, StepRegistry};
    pub use crate::workflow::{WorkflowConfig, WorkflowRunner};
}
