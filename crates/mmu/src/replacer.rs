mod clock_replacer;
mod engine;
mod fifo_replacer;
mod lru_replacer;
#[allow(clippy::module_inception)]
mod replacer;

pub use engine::{Policy, ReplacementEngine};
pub use replacer::{Replacer, Victim};
