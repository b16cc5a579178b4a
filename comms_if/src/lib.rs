//! # Communications interface
//!
//! This crate defines the types shared between the control software and its
//! collaborators - telecommands coming in from scripts or operators, and the
//! demands/measurements exchanged with the mechanisms layer.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod eqpt;
pub mod tc;
