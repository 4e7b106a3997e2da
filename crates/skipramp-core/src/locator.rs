//! Playback target resolution.

use skipramp_protocols::{NodeId, PageError, PlayerPage};

/// Player root element on the known video site.
pub const CONTAINER_SELECTOR: &str = ".html5-video-player";

/// Media element tag.
pub const MEDIA_SELECTOR: &str = "video";

/// The pair of elements every feature operates on.
///
/// Only valid for the tick that resolved it. Callers drop it on any
/// [`PageError::StaleNode`] and resolve again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackTarget {
    pub container: NodeId,
    pub media: NodeId,
}

/// Finds the player container and its media element.
#[derive(Debug, Clone)]
pub struct TargetLocator {
    container_selector: String,
    media_selector: String,
}

impl Default for TargetLocator {
    fn default() -> Self {
        Self::new(CONTAINER_SELECTOR, MEDIA_SELECTOR)
    }
}

impl TargetLocator {
    pub fn new(container_selector: impl Into<String>, media_selector: impl Into<String>) -> Self {
        Self {
            container_selector: container_selector.into(),
            media_selector: media_selector.into(),
        }
    }

    /// Resolve the target, or `None` if either element is absent.
    ///
    /// Prefers a media element inside the container and falls back to the
    /// first one in the document. Safe to call on every tick.
    pub async fn locate<P>(&self, page: &P) -> Result<Option<PlaybackTarget>, PageError>
    where
        P: PlayerPage + ?Sized,
    {
        let Some(container) = page
            .query_all(&self.container_selector)
            .await?
            .into_iter()
            .next()
        else {
            return Ok(None);
        };

        let candidates = page.query_all(&self.media_selector).await?;
        let Some(first) = candidates.first().copied() else {
            return Ok(None);
        };

        for media in candidates {
            match page.closest(media, &self.container_selector).await {
                Ok(Some(owner)) if owner == container => {
                    return Ok(Some(PlaybackTarget { container, media }));
                }
                Ok(_) | Err(PageError::StaleNode(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        Ok(Some(PlaybackTarget {
            container,
            media: first,
        }))
    }
}
