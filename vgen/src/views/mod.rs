//! Generated views
//!
//! The three view-surface stages: the meter overlay, the master overlay and
//! the navigation buttons injected into the host tool's own views.

pub mod master;
pub mod meter;
pub mod nav;
