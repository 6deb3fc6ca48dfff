pub mod accelerator;
pub mod component;
pub mod executor;

pub use accelerator::Accelerator;
pub use component::{Coregistration, EntryPoint, ProgressCallback, Transform};
pub use executor::WorkflowRunner;
