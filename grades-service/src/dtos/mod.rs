pub mod stats;

pub use stats::ClassStats;
