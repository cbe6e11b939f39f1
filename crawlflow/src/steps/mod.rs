//! Steps and the composite execution engine.
//!
//! A step is either a leaf, which performs one HTTP exchange, or a composite
//! that registers child steps and runs them in order. The same trait serves
//! both roles: a step that registers no children is a leaf.

mod descriptor;
mod engine;
mod registry;
mod step;

pub use descriptor::{StepDescriptor, StepList};
pub use engine::start;
pub use registry::StepRegistry;
pub use step::{merge_cookies, short_type_name, Step};
