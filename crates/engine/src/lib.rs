pub mod advice;
pub mod context;
pub mod estimate;

pub use context::EngineContext;
