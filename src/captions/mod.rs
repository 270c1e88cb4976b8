//! Caption Data Model and SRT Handling
//!
//! One shared implementation of the caption block model, the SRT
//! serializer/parser, and the short-block display merger. Both the
//! generation pipeline and the renderer path go through this module, so the
//! two sides cannot drift apart.

mod models;
pub use models::*;

mod formats;
pub use formats::*;

mod merge;
pub use merge::*;
