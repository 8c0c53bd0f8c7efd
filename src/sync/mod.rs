// src/sync/mod.rs

//! Spoiler reconciliation
//!
//! The pipeline for each item is classify, resolve the field policy, lay
//! overrides over it, then diff against what the catalog shows:
//!
//! - [`marker`]: recognises fields that hold our marker
//! - [`classify`]: ignore list and watched state
//! - [`policy`]: desired visibility per field
//! - [`overrides`]: targeted force-hide/unhide and restore-all
//! - [`reconcile`]: per-field state machine producing the write plan
//! - [`runner`]: applies plans across libraries and builds the report

pub mod classify;
pub mod marker;
pub mod overrides;
pub mod policy;
pub mod reconcile;
pub mod report;
pub mod runner;

pub use classify::{IgnoreList, ItemClass, classify};
pub use marker::{MarkerSet, is_hidden_marker};
pub use overrides::{ForcedStates, InvalidItemUri, ItemUri, Overrides};
pub use policy::{DesiredFields, DesiredState, Policy, Visibility};
pub use reconcile::{FieldOp, FieldState, WriteAction, WritePlan, decide, plan_item};
pub use report::{ItemFailure, RunReport};
pub use runner::{RunOptions, run};
