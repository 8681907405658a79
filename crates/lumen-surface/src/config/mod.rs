//! Context configuration selection.
//!
//! This module is responsible for:
//! - describing the channel/depth/stencil precision a surface asks for
//! - matching that request against what the platform offers
//! - walking an ordered fallback chain when the primary request has no match

mod chooser;

pub use chooser::{ConfigChooser, ContextConfig};
