//! The composite/leaf execution engine.
//!
//! `start` walks the step tree depth first. A step that fails its
//! pre-condition, or that is reached after the response finished, does
//! nothing. A composite runs its children in registration order and stops
//! at the first child whose post-condition fails or that finished the
//! response. A leaf performs one HTTP exchange.

use super::{Step, StepList};
use crate::context::{SessionContext, WorkflowResponse};
use crate::errors::CrawlError;
use crate::http::{is_success_status, StepResponse, TransportResponse};
use crate::observability::SpanTimer;
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use tracing::debug;

/// Runs a step, and everything below it, against a session context.
///
/// Errors are never caught on the way up: the first transport or
/// configuration error aborts the whole run.
///
/// # Errors
///
/// Returns the first error raised by a hook, a child factory, the request
/// builder or the transport.
pub fn start<'a, R: WorkflowResponse>(
    step: &'a mut dyn Step<R>,
    ctx: &'a mut SessionContext<R>,
) -> BoxFuture<'a, Result<(), CrawlError>> {
    async move {
        if !step.pre_condition(ctx) {
            debug!(step = step.name(), "Pre-condition not met, skipping step");
            return Ok(());
        }
        if ctx.signal().is_stop() {
            debug!(step = step.name(), "Response finished, skipping step");
            return Ok(());
        }

        let mut children = StepList::new();
        step.steps(&mut children);

        if children.is_empty() {
            return exchange(step, ctx).await;
        }

        debug!(step = step.name(), children = children.len(), "Running composite step");
        for descriptor in children {
            ctx.set_last_step(descriptor.name());
            let mut child = descriptor.instantiate()?;

            start(child.as_mut(), ctx).await?;

            if !child.post_condition(ctx) {
                debug!(step = child.name(), "Post-condition failed, stopping siblings");
                break;
            }
            if ctx.signal().is_stop() {
                debug!(step = child.name(), "Response finished, stopping siblings");
                break;
            }
        }

        Ok(())
    }
    .boxed()
}

async fn exchange<R: WorkflowResponse>(
    step: &mut dyn Step<R>,
    ctx: &mut SessionContext<R>,
) -> Result<(), CrawlError> {
    let name = step.name().to_string();

    let mut spec = step.request();
    step.before(ctx, &mut spec)?;
    let request = spec.build(ctx.base_url(), ctx.cookies())?;
    let url = request.url.clone();

    let transport = Arc::clone(ctx.transport());
    let timer = SpanTimer::start(&name);
    ctx.log_trace(&format!("Sent ({name}) => {url}"));

    let TransportResponse {
        status,
        headers,
        body,
    } = transport
        .send(request)
        .await
        .map_err(|e| CrawlError::in_step(&name, e))?;

    let body = if is_success_status(status) {
        let text = body
            .read_to_string()
            .await
            .map_err(|e| CrawlError::in_step(&name, e))?;
        ctx.log_trace(&format!("Response OK => {url}"));
        Some(text)
    } else {
        ctx.log_trace(&format!("Response error => {url}"));
        None
    };

    debug!(
        step = %name,
        status,
        duration_ms = timer.finish(),
        "Exchange completed"
    );

    let response = StepResponse {
        url,
        status,
        headers,
        body,
    };
    step.after(ctx, &response)
}
