//! # Compiler Types
//!
//! Inputs read from collaborating repositories (templates, issuers, offer
//! requests) and the `OpenID4VCI` documents the compiler produces.

mod attributes;
mod metadata;
mod offer;
mod template;

pub use attributes::*;
pub use metadata::*;
pub use offer::*;
pub use template::*;
