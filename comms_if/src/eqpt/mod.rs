//! # Equipment Interface
//!
//! This module defines the interface structures which are exchanged with equipment processes.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod act;
pub mod cam;
