//! Read-only analyses over a [`TaskGraph`](crate::graph::TaskGraph).
//!
//! Every analysis takes a freshly loaded graph, never mutates it, and only
//! follows `blocks` edges.

pub mod critical_path;
pub mod impact;

pub use critical_path::{Bottleneck, CriticalPath, find_critical_path};
pub use impact::{Impact, RiskLevel, analyze_impact};
