//! Output rendering.
//!
//! - [`digest`]: turns one article's tone summaries into the message handed to
//!   the delivery collaborator, capped to the transport's message size

pub mod digest;
