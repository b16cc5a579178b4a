//! # Equipment interface module
//!
//! Defines the data exchanged with equipment (mechanisms) collaborators.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod mech;
