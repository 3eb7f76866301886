//! Board domain model.
//!
//! # Responsibility
//! - Define the task and swim lane records shared by every board view.
//! - Own input normalization and validation for user-entered fields.
//!
//! # Invariants
//! - Task ids are stable UUIDs and never reused.
//! - A task's `status` is the id of the lane that holds it.

pub mod swim_lane;
pub mod task;
