pub mod analyzer;
pub mod clients;
pub mod config;
pub mod domains;
pub mod entities;
pub mod signals;
pub mod verdict;

pub use analyzer::Analyzer;
pub use clients::Collaborators;
pub use config::{EngineConfig, ScanOptions, ScoringPolicy};
pub use signals::{SignalKind, SignalReport};
pub use verdict::{ScanResult, ThreatLevel, Verdict};
