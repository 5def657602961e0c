//! # inquest-rules
//!
//! The validation engine: a closed vocabulary of validation types, the
//! pipeline object that accumulates steps, and the interrogation that runs
//! them against a frame.
//!
//! This crate provides:
//! - `RuleKind` (the closed vocabulary) and `Rule` (validated parameters)
//! - `Thresholds` (failure tolerances: zero, absolute count, or fraction)
//! - `Validator` (ordered, append-only step list bound to a table name)
//! - `interrogate` (execute every step; per-row masks, evidence, sundering)
//! - report shaping (per-step JSON entries and a flat frame for CSV)
//!
//! It intentionally does not load tables or hold registries. Those concerns
//! live in `inquest-table` and `inquest-session`.
//!
//! ## Step lifecycle
//!
//! ```text
//! JSON params ──parse──▶ Rule ──append──▶ Validator
//!                                            │ interrogate(frame)
//!                                            ▼
//!                       Interrogation { steps, extracts, sundered rows }
//! ```

pub mod error;
pub mod interrogate;
pub mod report;
pub mod rule;
pub mod scalar;
pub mod thresholds;
pub mod validator;

pub use error::RuleError;
pub use interrogate::{Interrogation, StepResult, SunderedKind, interrogate};
pub use report::{report_frame, step_summaries};
pub use rule::{ColumnSpec, CompareOp, Rule, RuleKind};
pub use scalar::ScalarValue;
pub use thresholds::{ThresholdSpec, Thresholds};
pub use validator::{Step, Validator};
