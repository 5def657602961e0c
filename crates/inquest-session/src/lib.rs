//! # inquest-session
//!
//! The stateful session layer: load tables, bind validator pipelines to
//! them, append validation steps, interrogate, and extract row-level
//! evidence. Every operation after loading moves through a stable
//! identifier chain (table id, validator id, optional step index).
//!
//! This crate provides:
//! - `Session` (the five operations; no globals, explicitly constructed)
//! - `TableRegistry` / `ValidatorRegistry` (id-keyed in-memory state)
//! - `SessionError` (the boundary error taxonomy)
//!
//! It intentionally performs no rule evaluation and parses no file formats.
//! Those concerns live in `inquest-rules` and `inquest-table`; this crate
//! sequences them.
//!
//! ## Workflow
//!
//! ```text
//! load_table ──▶ create_validator ──▶ add_step* ──▶ interrogate ──▶ extract
//!   tbl_…            vld_…            index 0,1,…     report         CSV
//! ```

pub mod error;
pub mod registry;
pub mod session;

pub use error::SessionError;
pub use registry::{Pipeline, TableHandle, TableRegistry, ValidatorRegistry};
pub use session::{
    CreateValidator, ExtractMode, ExtractOutcome, InterrogateOutcome, Session, StepInfo, TableInfo,
    ValidatorInfo,
};
