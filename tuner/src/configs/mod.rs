mod adapter;
mod tuner;

pub use adapter::Adapter;
pub use tuner::{DomainConfig, KnobConfig, TunerConfig};
