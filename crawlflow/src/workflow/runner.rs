//! The workflow runner.

use super::WorkflowConfig;
use crate::context::{SessionContext, WorkflowResponse};
use crate::errors::CrawlError;
use crate::http::{ReqwestTransport, Transport};
use crate::observability::{Logger, SpanTimer, TracingLogger};
use crate::steps::{start, Step, StepRegistry};
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Runs workflows against one configuration.
///
/// A runner can be reused: every run gets a fresh [`SessionContext`] sharing
/// the runner's transport and logger.
pub struct WorkflowRunner {
    config: WorkflowConfig,
    transport: Arc<dyn Transport>,
    logger: Arc<dyn Logger>,
}

impl WorkflowRunner {
    /// Creates a runner with explicit collaborators.
    #[must_use]
    pub fn new(config: WorkflowConfig, transport: Arc<dyn Transport>, logger: Arc<dyn Logger>) -> Self {
        Self {
            config,
            transport,
            logger,
        }
    }

    /// Creates a runner using `reqwest` and `tracing`.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` for an invalid configuration, or the error
    /// raised while building the HTTP client.
    pub fn from_config(config: WorkflowConfig) -> Result<Self, CrawlError> {
        config.validate()?;
        let transport = ReqwestTransport::from_config(&config.transport)?;
        Ok(Self::new(
            config,
            Arc::new(transport),
            Arc::new(TracingLogger::new()),
        ))
    }

    /// Replaces the logger.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Replaces the transport.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Builds a session context holding a default response.
    #[must_use]
    pub fn context<R: WorkflowResponse + Default>(&self) -> SessionContext<R> {
        self.context_with(R::default())
    }

    /// Builds a session context holding `response`, with the configured
    /// base URL, execution identifier and credentials applied.
    #[must_use]
    pub fn context_with<R: WorkflowResponse>(&self, response: R) -> SessionContext<R> {
        let mut ctx = SessionContext::with_response(
            Arc::clone(&self.transport),
            Arc::clone(&self.logger),
            response,
        )
        .with_base_url(self.config.base_url.clone());

        if let Some(execution_id) = &self.config.execution_id {
            ctx.set_execution_id(execution_id.clone());
        }
        if let Some(credentials) = &self.config.credentials {
            ctx.set_login(credentials.login.clone(), credentials.password.clone());
        }
        ctx
    }

    /// Runs `root` with a default response and returns the final response.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the step tree.
    pub async fn run<R: WorkflowResponse + Default>(&self, root: &mut dyn Step<R>) -> Result<R, CrawlError> {
        self.run_with(root, R::default()).await
    }

    /// Runs `root` starting from `response`.
    ///
    /// The context is disposed whatever the outcome. A failure is reported
    /// through the session logger before it is returned.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the step tree.
    pub async fn run_with<R: WorkflowResponse>(
        &self,
        root: &mut dyn Step<R>,
        response: R,
    ) -> Result<R, CrawlError> {
        let mut ctx = self.context_with(response);
        let root_name = root.name().to_string();
        let timer = SpanTimer::start(&root_name);

        info!(execution_id = %ctx.execution_id(), root = %root_name, "Starting workflow");

        match start(root, &mut ctx).await {
            Ok(()) => {
                info!(
                    execution_id = %ctx.execution_id(),
                    root = %root_name,
                    finished = ctx.is_finished(),
                    duration_ms = timer.finish(),
                    "Workflow completed"
                );
                Ok(ctx.into_response())
            }
            Err(error) => {
                let step = ctx.last_step().unwrap_or(root_name.as_str()).to_string();
                ctx.log_error(&error, &format!("Workflow failed at step '{step}'"));
                ctx.dispose();
                Err(error)
            }
        }
    }

    /// Builds the root step from a registry and runs it.
    ///
    /// # Errors
    ///
    /// Returns a `StepConstruction` error if the root cannot be built, or
    /// the first error raised by the step tree.
    pub async fn run_registered<R: WorkflowResponse + Default>(
        &self,
        registry: &StepRegistry<R>,
        name: &str,
        args: serde_json::Value,
    ) -> Result<R, CrawlError> {
        let mut root = registry.construct(name, args)?;
        self.run(root.as_mut()).await
    }

    /// Runs `root` to completion on a current-thread runtime.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` when called from inside a tokio runtime, `Io`
    /// if the runtime cannot be built, otherwise the first error raised by
    /// the step tree.
    pub fn run_blocking<R: WorkflowResponse + Default>(&self, root: &mut dyn Step<R>) -> Result<R, CrawlError> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(CrawlError::Configuration(
                "run_blocking called from inside an async runtime; use run instead".to_string(),
            ));
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.run(root))
    }
}

impl fmt::Debug for WorkflowRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowRunner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ResponseBase, START_STEP};
    use crate::http::StepResponse;
    use crate::observability::LogLevel;
    use crate::testing::{
        assert_journal, assert_logged, CollectingLogger, Journal, RecordingStep, ScriptedTransport,
        SequenceStep,
    };
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    fn runner() -> (WorkflowRunner, Arc<ScriptedTransport>, Arc<CollectingLogger>) {
        let transport = Arc::new(ScriptedTransport::new());
        let logger = Arc::new(CollectingLogger::new());
        let config = WorkflowConfig::new("http://portal.test/")
            .with_execution_id("run-1")
            .with_credentials("bot", "pw");
        let runner = WorkflowRunner::new(
            config,
            Arc::clone(&transport) as _,
            Arc::clone(&logger) as _,
        );
        (runner, transport, logger)
    }

    #[derive(Debug, Deserialize)]
    struct StatusPage {
        path: String,
    }

    impl Step<ResponseBase> for StatusPage {
        fn request(&self) -> crate::http::RequestSpec {
            crate::http::RequestSpec::get().with_url(format!("http://portal.test/{}", self.path))
        }

        fn after(
            &mut self,
            ctx: &mut SessionContext<ResponseBase>,
            response: &StepResponse,
        ) -> Result<(), CrawlError> {
            ctx.response_mut().finish_with(format!("{} {}", response.status, response.text()));
            Ok(())
        }
    }

    #[test]
    fn test_context_applies_config() {
        let (runner, _, _) = runner();
        let ctx = runner.context::<ResponseBase>();

        assert_eq!(ctx.execution_id(), "run-1");
        assert_eq!(ctx.base_url(), "http://portal.test/");
        assert_eq!(ctx.last_step(), Some(START_STEP));
        assert_eq!(ctx.credentials().map(|c| c.login.as_str()), Some("bot"));
    }

    #[tokio::test]
    async fn test_run_returns_final_response() {
        let (runner, transport, _) = runner();
        transport.push_response(200, crate::http::HeaderMap::new(), "done");

        let response = runner.run::<ResponseBase>(&mut StatusPage { path: "status".to_string() }).await.unwrap();

        assert_eq!(response.detail.as_deref(), Some("200 done"));
        assert_eq!(transport.urls(), vec!["http://portal.test/status"]);
    }

    #[tokio::test]
    async fn test_run_logs_failure_with_last_step() {
        let (runner, transport, logger) = runner();
        transport.push_error("connection reset");
        let journal = Journal::new();
        let mut root = SequenceStep::new("root")
            .child(RecordingStep::new("home", &journal))
            .child(RecordingStep::new("search", &journal));

        let err = runner.run::<ResponseBase>(&mut root).await.unwrap_err();

        assert!(err.is_transport());
        assert_journal(&journal, &["home"]);
        assert_logged(&logger, LogLevel::Info, "Id: 'run-1' - Workflow failed at step 'home'");
        assert_logged(&logger, LogLevel::Trace, "Workflow failed at step 'home'");
        assert_eq!(logger.exceptions().len(), 1);
    }

    #[tokio::test]
    async fn test_run_registered() {
        let (runner, transport, _) = runner();
        let mut registry = StepRegistry::<ResponseBase>::new();
        registry.register_deserialize::<StatusPage>("status_page");

        let response = runner
            .run_registered(&registry, "status_page", serde_json::json!({"path": "health"}))
            .await
            .unwrap();
        assert_eq!(response.detail.as_deref(), Some("200 "));
        assert_eq!(transport.urls(), vec!["http://portal.test/health"]);

        let err = runner
            .run_registered(&registry, "nope", serde_json::Value::Null)
            .await
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_run_blocking() {
        let (runner, transport, _) = runner();
        let journal = Journal::new();
        let mut leaf = RecordingStep::new("only", &journal).finishing();

        let response = runner.run_blocking::<ResponseBase>(&mut leaf).unwrap();

        assert!(response.is_finished());
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_run_blocking_inside_runtime_is_rejected() {
        let (runner, transport, _) = runner();
        let journal = Journal::new();
        let mut leaf = RecordingStep::new("only", &journal);

        let err = runner.run_blocking::<ResponseBase>(&mut leaf).unwrap_err();

        assert!(matches!(&err, CrawlError::Configuration(msg) if msg.contains("use run instead")));
        assert_eq!(transport.request_count(), 0);
        assert_journal(&journal, &[]);
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let err = WorkflowRunner::from_config(WorkflowConfig::new("not a url")).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_from_config_builds_reqwest_runner() {
        let runner = WorkflowRunner::from_config(WorkflowConfig::new("http://portal.test/")).unwrap();
        assert_eq!(runner.config().base_url, "http://portal.test/");
    }
}
