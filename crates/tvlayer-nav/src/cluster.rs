#![forbid(unsafe_code)]

//! Row clustering: group cards into horizontal bands.
//!
//! # Algorithm
//!
//! 1. Measure each card once; its band key is the top edge in document
//!    coordinates (viewport top + scroll offset), rounded.
//! 2. Scan cards in discovery order. A card joins the **first** open bucket
//!    whose key differs from its own by less than the band tolerance;
//!    otherwise it opens a new bucket keyed by its own offset.
//! 3. Sort buckets top-to-bottom, then each bucket's members left-to-right.
//! 4. Drop buckets with fewer than `min_row_len` members (promo strips,
//!    lone hero banners) and keep at most `max_rows`.
//!
//! # Invariants
//!
//! - Output rows are sorted by offset, members by left edge.
//! - Every output row has at least `min_row_len` members.
//! - At most `max_rows` rows are returned.
//! - First-bucket-wins: a card within tolerance of two buckets joins the one
//!   opened earlier, not the nearer one. The bucket key never moves once
//!   opened.
//! - Overlapping cards are not deduplicated.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::candidate::CardElement;

/// Clustering tunables.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClusterConfig {
    /// Two offsets closer than this (px) share a row.
    pub band_tolerance: f64,
    /// Rows with fewer members are discarded as noise.
    pub min_row_len: usize,
    /// Maximum number of rows retained.
    pub max_rows: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            band_tolerance: 44.0,
            min_row_len: 3,
            max_rows: 8,
        }
    }
}

/// One horizontal band of cards, ordered left-to-right.
#[derive(Debug, Clone, PartialEq)]
pub struct Row<C> {
    /// Band key: rounded document-space top edge of the first member seen.
    pub offset: i64,
    /// Members, sorted by left edge.
    pub cards: Vec<C>,
}

impl<C> Row<C> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

struct Bucket<C> {
    offset: i64,
    members: Vec<(C, f64)>,
}

fn within_band(a: i64, b: i64, tolerance: f64) -> bool {
    (a.abs_diff(b) as f64) < tolerance
}

/// Group `cards` into rows.
///
/// `scroll_y` is the page scroll offset at measurement time. Empty input
/// yields no rows.
pub fn cluster_rows<C, I>(cards: I, scroll_y: f64, config: &ClusterConfig) -> Vec<Row<C>>
where
    C: CardElement,
    I: IntoIterator<Item = C>,
{
    let mut buckets: Vec<Bucket<C>> = Vec::new();
    let mut measured = 0usize;

    for card in cards {
        let rect = card.bounds();
        let offset = rect.document_top(scroll_y);
        measured += 1;
        match buckets
            .iter_mut()
            .find(|bucket| within_band(bucket.offset, offset, config.band_tolerance))
        {
            Some(bucket) => bucket.members.push((card, rect.left())),
            None => buckets.push(Bucket {
                offset,
                members: vec![(card, rect.left())],
            }),
        }
    }

    let opened = buckets.len();
    buckets.sort_by_key(|bucket| bucket.offset);

    let rows: Vec<Row<C>> = buckets
        .into_iter()
        .map(|mut bucket| {
            bucket.members.sort_by(|a, b| a.1.total_cmp(&b.1));
            Row {
                offset: bucket.offset,
                cards: bucket.members.into_iter().map(|(card, _)| card).collect(),
            }
        })
        .filter(|row| row.len() >= config.min_row_len)
        .take(config.max_rows)
        .collect();

    tracing::debug!(
        message = "cluster.rows",
        measured,
        opened,
        retained = rows.len()
    );
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockCard;
    use pretty_assertions::assert_eq;

    fn hrefs(rows: &[Row<MockCard>]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.cards.iter().filter_map(CardElement::href).collect())
            .collect()
    }

    fn sizes(rows: &[Row<MockCard>]) -> Vec<usize> {
        rows.iter().map(Row::len).collect()
    }

    #[test]
    fn empty_input_gives_no_rows() {
        let rows = cluster_rows(Vec::<MockCard>::new(), 0.0, &ClusterConfig::default());
        assert!(rows.is_empty());
    }

    #[test]
    fn bands_split_and_short_rows_drop() {
        let tops = [100.0, 100.0, 300.0, 300.0, 300.0, 520.0, 520.0, 520.0, 520.0];
        let cards: Vec<MockCard> = tops
            .iter()
            .enumerate()
            .map(|(i, &top)| MockCard::at(&format!("/{i}"), i as f64 * 210.0, top))
            .collect();

        let keep_all = ClusterConfig {
            min_row_len: 1,
            ..ClusterConfig::default()
        };
        assert_eq!(sizes(&cluster_rows(cards.clone(), 0.0, &keep_all)), vec![2, 3, 4]);
        assert_eq!(
            sizes(&cluster_rows(cards, 0.0, &ClusterConfig::default())),
            vec![3, 4]
        );
    }

    #[test]
    fn rows_sort_top_to_bottom_and_left_to_right() {
        let cards = vec![
            MockCard::at("/b2", 400.0, 300.0),
            MockCard::at("/a1", 200.0, 100.0),
            MockCard::at("/b0", 0.0, 300.0),
            MockCard::at("/a0", 0.0, 100.0),
            MockCard::at("/b1", 200.0, 300.0),
            MockCard::at("/a2", 400.0, 100.0),
        ];
        let rows = cluster_rows(cards, 0.0, &ClusterConfig::default());
        assert_eq!(
            hrefs(&rows),
            vec![
                vec!["/a0".to_owned(), "/a1".to_owned(), "/a2".to_owned()],
                vec!["/b0".to_owned(), "/b1".to_owned(), "/b2".to_owned()],
            ]
        );
        assert_eq!(rows[0].offset, 100);
        assert_eq!(rows[1].offset, 300);
    }

    #[test]
    fn jitter_within_tolerance_merges() {
        let cards = vec![
            MockCard::at("/0", 0.0, 100.0),
            MockCard::at("/1", 200.0, 143.0),
            MockCard::at("/2", 400.0, 57.0),
        ];
        let rows = cluster_rows(cards, 0.0, &ClusterConfig::default());
        assert_eq!(sizes(&rows), vec![3]);
    }

    #[test]
    fn tolerance_boundary_is_exclusive() {
        let cards = vec![
            MockCard::at("/0", 0.0, 100.0),
            MockCard::at("/1", 200.0, 144.0),
        ];
        let config = ClusterConfig {
            min_row_len: 1,
            ..ClusterConfig::default()
        };
        assert_eq!(sizes(&cluster_rows(cards, 0.0, &config)), vec![1, 1]);
    }

    #[test]
    fn first_bucket_wins_over_nearest() {
        // Buckets open at 100 and 145; a card at 130 is within 44 of both
        // and nearer to 145, but joins the bucket opened first.
        let cards = vec![
            MockCard::at("/first", 0.0, 100.0),
            MockCard::at("/second", 0.0, 145.0),
            MockCard::at("/probe", 200.0, 130.0),
        ];
        let config = ClusterConfig {
            min_row_len: 1,
            ..ClusterConfig::default()
        };
        let rows = cluster_rows(cards, 0.0, &config);
        assert_eq!(
            hrefs(&rows),
            vec![
                vec!["/first".to_owned(), "/probe".to_owned()],
                vec!["/second".to_owned()],
            ]
        );
    }

    #[test]
    fn bucket_key_does_not_drift() {
        // 100 -> 140 -> 180: the third card is 80px from the key (100),
        // so it opens a new row even though it is 40px from its neighbour.
        let cards = vec![
            MockCard::at("/0", 0.0, 100.0),
            MockCard::at("/1", 200.0, 140.0),
            MockCard::at("/2", 400.0, 180.0),
        ];
        let config = ClusterConfig {
            min_row_len: 1,
            ..ClusterConfig::default()
        };
        assert_eq!(sizes(&cluster_rows(cards, 0.0, &config)), vec![2, 1]);
    }

    #[test]
    fn scroll_offset_shifts_keys() {
        let cards = vec![
            MockCard::at("/0", 0.0, -50.0),
            MockCard::at("/1", 200.0, -50.0),
            MockCard::at("/2", 400.0, -50.0),
        ];
        let rows = cluster_rows(cards, 650.4, &ClusterConfig::default());
        assert_eq!(rows[0].offset, 600);
    }

    #[test]
    fn row_count_is_capped() {
        let cards: Vec<MockCard> = (0..12)
            .flat_map(|row| {
                (0..3).map(move |col| {
                    MockCard::at(&format!("/{row}/{col}"), col as f64 * 210.0, row as f64 * 200.0)
                })
            })
            .collect();
        let rows = cluster_rows(cards, 0.0, &ClusterConfig::default());
        assert_eq!(rows.len(), 8);
        assert_eq!(rows[7].offset, 1400);
    }

    #[test]
    fn overlapping_cards_are_kept() {
        let cards = vec![
            MockCard::at("/0", 0.0, 100.0),
            MockCard::at("/1", 0.0, 100.0),
            MockCard::at("/2", 100.0, 100.0),
        ];
        let rows = cluster_rows(cards, 0.0, &ClusterConfig::default());
        assert_eq!(sizes(&rows), vec![3]);
        // Equal left edges keep discovery order.
        assert_eq!(rows[0].cards[0].href().as_deref(), Some("/0"));
    }
}
