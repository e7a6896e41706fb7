//! Hybrid entity extraction for Latin funerary inscriptions.
//!
//! Roman epitaphs are short, formulaic, and damaged in predictable
//! ways, which makes them a good fit for layered rule-based
//! extraction: a literal rule table catches known name forms and
//! stock formulas, grammatical templates catch unlisted names by
//! their structural position, and an optional external linguistic
//! analyzer adds case- and dependency-driven readings. The
//! consolidator reconciles those independent, imperfect attempts
//! into one confidence-scored entity per key.
//!
//! # Example
//!
//! ```rust
//! use titulus::{ExtractOptions, HybridExtractor};
//!
//! let extractor = HybridExtractor::new();
//! let entities = extractor
//!     .extract("D M GAIVS IVLIVS CAESAR", &ExtractOptions::default())
//!     .unwrap();
//! assert_eq!(entities["praenomen"].value, "Gaius");
//! assert_eq!(entities["status"].value, "dis manibus");
//! ```
//!
//! Pipeline stages, in order: [`normalize`], the four [`phases`],
//! [`consolidate`], [`filter`]. [`HybridExtractor`] wires them
//! together and is the sole entry point.

pub mod adapter;
pub mod consolidate;
pub mod filter;
pub mod lexicon;
pub mod normalize;
pub mod phases;
pub mod pipeline;
pub mod report;

pub use adapter::{LazyAnalyzer, LinguisticAnalyzer};
pub use normalize::NormalizedText;
pub use pipeline::{ExtractOptions, HybridExtractor};
pub use report::{Complexity, ExtractionReport, ReportStatistics, StructuralAnalysis};

pub use titulus_core::{
    Agreement, AlternativeValue, Confidence, ConsolidatedEntity, DependencyEdge, EntityKey,
    EntityKind, Error, FinalEntity, LinguisticTag, Phase, RawCandidate, Result,
};
