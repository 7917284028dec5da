pub mod analyzer;

pub use analyzer::analyze_track;
