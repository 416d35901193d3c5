use futures::TryStreamExt;
use tracing::debug;

use crate::error::ScrapeError;
use crate::request::{ScrapeOptions, Target};
use crate::source::{Post, PostSource};

/// Pull at most `limit` posts from `source`, in order.
///
/// The stream is dropped as soon as the buffer is full, so the source never
/// produces more than it hands over.
pub async fn collect(
    source: &dyn PostSource,
    target: &Target,
    options: &ScrapeOptions,
    limit: usize,
) -> Result<Vec<Post>, ScrapeError> {
    let mut stream = source.posts(target, options);
    let mut posts = Vec::with_capacity(limit);
    while posts.len() < limit {
        let Some(post) = stream.try_next().await? else {
            break;
        };
        posts.push(post);
    }
    debug!(count = posts.len(), limit, "Collection finished");
    Ok(posts)
}
