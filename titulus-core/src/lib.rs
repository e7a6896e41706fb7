//! Core types for the titulus inscription extractor.
//!
//! This crate holds the data model shared by the extraction engine
//! and the CLI: entity kinds and keys, extraction phases, confidence
//! witnesses, candidate/result structs, linguistic-analysis types,
//! and the error taxonomy. It deliberately contains no extraction
//! logic.

pub mod analysis;
pub mod confidence;
pub mod entity;
pub mod error;

pub use analysis::{Case, DependencyEdge, Gender, LinguisticTag, Number, Pos};
pub use confidence::{Confidence, AGREEMENT_BOOST, AGREEMENT_CEILING};
pub use entity::{
    Agreement, AlternativeValue, ConsolidatedEntity, EntityKey, EntityKind, FinalEntity, Phase,
    RawCandidate,
};
pub use error::{Error, Result};
