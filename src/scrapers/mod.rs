//! Acquisition side of the pipeline: listing pages in, cleaned article text out.
//!
//! Every configured source goes through the same two phases:
//!
//! 1. **Discovery** ([`discovery`]): fetch the section listing page and keep
//!    the links the source's [`LinkRule`](crate::models::LinkRule) accepts
//! 2. **Extraction** ([`extract`]): fetch each article page, locate the
//!    content container (primary selector, then fallbacks) and clean its text
//!
//! Both phases share one [`PageFetcher`](fetch::PageFetcher), so the timeout
//! and browser User-Agent are applied uniformly. Failures are logged and turn
//! into "nothing found" for the affected source or article.

pub mod discovery;
pub mod extract;
pub mod fetch;
