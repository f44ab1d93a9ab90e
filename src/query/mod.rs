//! Query module
//! Folds the builder state into a Flux pipeline.

pub mod assembler;
pub mod flux;

pub use assembler::{assemble, try_assemble, AssembleError, Assembler};
