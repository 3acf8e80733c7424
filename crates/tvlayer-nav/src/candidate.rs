#![forbid(unsafe_code)]

//! Card discovery: which page elements take part in navigation.
//!
//! The host page exposes its anchor-like elements through [`PageRoot`]; a
//! [`CandidateExtractor`] filters them down to cards. The default
//! [`LinkExtractor`] keeps a link when all of these hold:
//!
//! - [`has_navigable_href`]: it points somewhere real.
//! - not [`is_excluded_destination`]: it is not an account/settings link.
//! - [`has_preview_media`]: it wraps a thumbnail or video preview.
//! - [`meets_min_size`]: it is large enough to be a card, not an icon.
//!
//! The result is truncated to [`ExtractorConfig::max_candidates`] to bound
//! the work of every rebuild.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use tvlayer_core::Rect;

/// Handle to a host element that may become a navigable card.
///
/// Handles are cheap to clone and compare by identity. Decoration writers
/// take `&self`: the element belongs to the host page and the handle only
/// points at it.
pub trait CardElement: Clone {
    /// Current bounding box, viewport relative.
    fn bounds(&self) -> Rect;

    /// Destination reference (the raw `href` attribute).
    fn href(&self) -> Option<String>;

    /// Human-readable label, if any.
    fn label(&self) -> Option<String>;

    /// Whether the element contains an image, video or preview thumbnail.
    fn has_preview_media(&self) -> bool;

    /// Whether the element is still in the page and rendered.
    fn is_attached(&self) -> bool;

    /// Tag the element with its grid position.
    fn set_grid_position(&self, row: usize, col: usize);

    /// Remove every decoration this crate wrote.
    fn clear_decorations(&self);

    /// Mark or unmark the element as the focused card.
    ///
    /// A focused card is the only keyboard-reachable one; unfocused cards
    /// are explicitly excluded from keyboard reachability.
    fn set_focused(&self, focused: bool);

    /// Move assistive-technology focus here without page-level scrolling.
    fn focus_without_scroll(&self);

    /// Scroll the element into the nearest visible position.
    fn scroll_into_view_nearest(&self);

    /// Activate the element (synthetic click).
    fn activate(&self);
}

/// The page the cards live in.
pub trait PageRoot {
    type Card: CardElement;

    /// Whether the page has a primary content container.
    fn has_main_container(&self) -> bool;

    /// Anchor-like elements with a destination, in document order.
    fn link_candidates(&self) -> Vec<Self::Card>;

    /// Vertical scroll offset of the page.
    fn scroll_y(&self) -> f64;
}

/// Pluggable card discovery.
pub trait CandidateExtractor<P: PageRoot> {
    /// Return the cards of `page`, in document order.
    fn extract(&self, page: &P) -> Vec<P::Card>;
}

impl<P, F> CandidateExtractor<P> for F
where
    P: PageRoot,
    F: Fn(&P) -> Vec<P::Card>,
{
    fn extract(&self, page: &P) -> Vec<P::Card> {
        self(page)
    }
}

/// Tunables for [`LinkExtractor`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExtractorConfig {
    /// Cards must be strictly wider than this (px).
    pub min_width: f64,
    /// Cards must be strictly taller than this (px).
    pub min_height: f64,
    /// Upper bound on the number of candidates returned.
    pub max_candidates: usize,
    /// Destinations containing any of these fragments are skipped.
    pub excluded_fragments: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_width: 80.0,
            min_height: 60.0,
            max_candidates: 120,
            excluded_fragments: vec!["/settings".to_owned(), "/subscriptions".to_owned()],
        }
    }
}

/// Default extractor: media-bearing links of card size.
#[derive(Debug, Clone, Default)]
pub struct LinkExtractor {
    config: ExtractorConfig,
}

impl LinkExtractor {
    /// Create an extractor with the given config.
    #[must_use]
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// The active config.
    #[must_use]
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Apply every predicate to one element.
    pub fn accepts<C: CardElement>(&self, card: &C) -> bool {
        let href = card.href().unwrap_or_default();
        has_navigable_href(&href)
            && !is_excluded_destination(&href, &self.config.excluded_fragments)
            && has_preview_media(card)
            && meets_min_size(
                &card.bounds(),
                self.config.min_width,
                self.config.min_height,
            )
    }
}

impl<P: PageRoot> CandidateExtractor<P> for LinkExtractor {
    fn extract(&self, page: &P) -> Vec<P::Card> {
        let links = page.link_candidates();
        let scanned = links.len();
        let cards: Vec<P::Card> = links
            .into_iter()
            .filter(|card| self.accepts(card))
            .take(self.config.max_candidates)
            .collect();
        tracing::trace!(
            message = "candidates.extract",
            scanned,
            accepted = cards.len()
        );
        cards
    }
}

/// The link goes somewhere: not empty, not an in-page anchor, not script.
#[must_use]
pub fn has_navigable_href(href: &str) -> bool {
    !href.is_empty() && !href.starts_with('#') && !href.starts_with("javascript:")
}

/// The destination matches one of the excluded fragments.
#[must_use]
pub fn is_excluded_destination(href: &str, excluded: &[String]) -> bool {
    excluded.iter().any(|fragment| href.contains(fragment.as_str()))
}

/// The element carries a preview image or video.
#[must_use]
pub fn has_preview_media<C: CardElement>(card: &C) -> bool {
    card.has_preview_media()
}

/// The box is strictly larger than the minimum card size.
#[must_use]
pub fn meets_min_size(bounds: &Rect, min_width: f64, min_height: f64) -> bool {
    bounds.width > min_width && bounds.height > min_height
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockCard, MockPage};

    fn card(href: &str) -> MockCard {
        MockCard::new(href, Rect::new(0.0, 0.0, 200.0, 120.0))
    }

    #[test]
    fn href_predicate() {
        assert!(has_navigable_href("/somechannel"));
        assert!(has_navigable_href("https://example.com/videos/1"));
        assert!(!has_navigable_href(""));
        assert!(!has_navigable_href("#top"));
        assert!(!has_navigable_href("javascript:void(0)"));
    }

    #[test]
    fn exclusion_predicate() {
        let excluded = ExtractorConfig::default().excluded_fragments;
        assert!(is_excluded_destination("/settings/profile", &excluded));
        assert!(is_excluded_destination("/subscriptions", &excluded));
        assert!(!is_excluded_destination("/directory/game", &excluded));
    }

    #[test]
    fn size_predicate_is_strict() {
        assert!(meets_min_size(&Rect::new(0.0, 0.0, 81.0, 61.0), 80.0, 60.0));
        assert!(!meets_min_size(&Rect::new(0.0, 0.0, 80.0, 200.0), 80.0, 60.0));
        assert!(!meets_min_size(&Rect::new(0.0, 0.0, 200.0, 60.0), 80.0, 60.0));
    }

    #[test]
    fn extractor_applies_all_predicates() {
        let page = MockPage::new(vec![
            card("/a"),
            card("#anchor"),
            card("/settings"),
            card("/b").without_media(),
            MockCard::new("/c", Rect::new(0.0, 0.0, 40.0, 40.0)),
            card("/d"),
        ]);
        let cards = LinkExtractor::default().extract(&page);
        let hrefs: Vec<_> = cards.iter().filter_map(CardElement::href).collect();
        assert_eq!(hrefs, vec!["/a".to_owned(), "/d".to_owned()]);
    }

    #[test]
    fn extractor_caps_candidates() {
        let links = (0..200).map(|i| card(&format!("/c/{i}"))).collect();
        let page = MockPage::new(links);
        let cards = LinkExtractor::default().extract(&page);
        assert_eq!(cards.len(), 120);
        assert_eq!(cards[0].href().as_deref(), Some("/c/0"));
    }

    #[test]
    fn closures_are_extractors() {
        let page = MockPage::new(vec![card("/a"), card("/b")]);
        let first_only =
            |p: &MockPage| -> Vec<MockCard> { p.link_candidates().into_iter().take(1).collect() };
        let cards = CandidateExtractor::extract(&first_only, &page);
        assert_eq!(cards.len(), 1);
    }
}
