//! Services: request-scoped orchestration on top of the builder and renderer.

pub mod generate;
