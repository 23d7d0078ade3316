//! depscope - Polyglot dependency usage and upgrade-risk analyzer library
//!
//! This library provides the core functionality for analyzing the
//! dependencies of Go, JVM (Maven, Gradle, SBT), Node.js, Python and Ruby
//! projects:
//! - Ecosystem and package-manager detection
//! - Manifest and lock-file parsing into a unified dependency graph
//! - Source-level usage measurement and criticality scoring
//! - Version comparison, changelog mining and upgrade recommendations

pub mod analyzer;
pub mod changelog;
pub mod cli;
pub mod config;
pub mod detector;
pub mod domain;
pub mod error;
pub mod graph;
pub mod locator;
pub mod manifest;
pub mod output;
pub mod parser;
pub mod progress;
pub mod recommend;
pub mod scoring;
pub mod tools;
pub mod usage;
pub mod version;
