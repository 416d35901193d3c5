use std::pin::Pin;

use futures::Stream;
use serde_json::Value;

use crate::error::ScrapeError;
use crate::request::{ScrapeOptions, Target};

/// A scraped post. Opaque to this service and passed through unchanged.
pub type Post = Value;

pub type PostStream = Pin<Box<dyn Stream<Item = Result<Post, ScrapeError>> + Send>>;

/// Produces posts for a target, lazily and in order.
///
/// Implementations must not do any work until the returned stream is polled,
/// and must only fetch what the consumer actually pulls.
pub trait PostSource: Send + Sync {
    fn posts(&self, target: &Target, options: &ScrapeOptions) -> PostStream;
}
