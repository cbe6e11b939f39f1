//! The step trait.

use super::StepList;
use crate::context::{SessionContext, WorkflowResponse};
use crate::errors::CrawlError;
use crate::http::{RequestSpec, StepResponse};

/// A node of a workflow tree.
///
/// Composite steps override [`Step::steps`] to register children; leaf
/// steps describe their request through [`Step::request`] and react to the
/// outcome in [`Step::after`]. Every hook receives the session context of the
/// current run.
pub trait Step<R: WorkflowResponse>: Send {
    /// Returns the step name used in logs.
    fn name(&self) -> &str {
        short_type_name::<Self>()
    }

    /// Registers child steps. Leaves register none.
    fn steps(&self, _steps: &mut StepList<R>) {}

    /// Decides whether the step runs at all.
    fn pre_condition(&self, _ctx: &SessionContext<R>) -> bool {
        true
    }

    /// Evaluated by the parent after this step returns. `false` skips the
    /// remaining siblings.
    fn post_condition(&self, _ctx: &SessionContext<R>) -> bool {
        true
    }

    /// Declares the request a leaf sends.
    fn request(&self) -> RequestSpec {
        RequestSpec::get()
    }

    /// Runs right before the request is built.
    fn before(
        &mut self,
        _ctx: &mut SessionContext<R>,
        _request: &mut RequestSpec,
    ) -> Result<(), CrawlError> {
        Ok(())
    }

    /// Runs after every exchange, whatever the status.
    ///
    /// The default merges the response cookies into the session jar.
    /// Overrides that still want that behaviour call [`merge_cookies`].
    fn after(&mut self, ctx: &mut SessionContext<R>, response: &StepResponse) -> Result<(), CrawlError> {
        merge_cookies(ctx, response);
        Ok(())
    }
}

/// Merges the `Set-Cookie` values of a response into the session jar.
pub fn merge_cookies<R: WorkflowResponse>(ctx: &mut SessionContext<R>, response: &StepResponse) -> usize {
    ctx.cookies_mut().merge_set_cookies(&response.headers)
}

/// Returns the type name of `T` without module path or generic arguments.
#[must_use]
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let without_generics = full.split('<').next().unwrap_or(full);
    without_generics.rsplit("::").next().unwrap_or(without_generics)
}
