//! Reader core for HTML user guides: recovers a two-level outline, cleans the
//! document for display and resolves outline entries to scroll targets.

pub mod anchor;
pub mod config;
pub mod dom;
pub mod nav;
pub mod session;
pub mod source;
pub mod toc;
pub mod transform;
