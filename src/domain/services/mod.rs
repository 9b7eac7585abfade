pub mod extractor;
mod reassembler;
mod typewriter;

pub use reassembler::*;
pub use typewriter::*;
