use std::collections::{HashMap, HashSet};

use crate::{
    catalog::{Catalog, RatingTable},
    models::{distinct_rows, BookId, BookRow, UserId},
};

/// Books that readers of the seed books also liked, most popular first
///
/// Peers are users who rated any seed book at or above `min_rating`. Their
/// other ratings at or above `min_rating` are counted per book, and the
/// `top_n` most counted books are returned. Equal counts keep the order in
/// which the books first appear in `ratings`. Seed books never appear.
pub fn recommend_by_peers(
    seeds: &[BookId],
    ratings: &RatingTable,
    catalog: &Catalog,
    top_n: usize,
    min_rating: u8,
) -> Vec<BookRow> {
    if seeds.is_empty() {
        return Vec::new();
    }
    let seeds: HashSet<BookId> = seeds.iter().copied().collect();

    let peers: HashSet<UserId> = ratings
        .iter()
        .filter(|r| seeds.contains(&r.book_id) && r.rating >= min_rating)
        .map(|r| r.user_id)
        .collect();

    if peers.is_empty() {
        tracing::debug!(seeds = seeds.len(), "No peers rated the seed books highly");
        return Vec::new();
    }

    // book -> (count, first appearance)
    let mut counts: HashMap<BookId, (usize, usize)> = HashMap::new();
    for (order, rating) in ratings.iter().enumerate() {
        if peers.contains(&rating.user_id)
            && !seeds.contains(&rating.book_id)
            && rating.rating >= min_rating
        {
            counts.entry(rating.book_id).or_insert((0, order)).0 += 1;
        }
    }

    let mut ranked: Vec<(BookId, usize, usize)> = counts
        .into_iter()
        .map(|(book_id, (count, first))| (book_id, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked.truncate(top_n);

    tracing::debug!(
        peers = peers.len(),
        candidates = ranked.len(),
        "Ranked peer favourites"
    );

    let mut rows = distinct_rows(ranked.iter().filter_map(|(id, _, _)| catalog.by_id(*id)));
    rows.truncate(top_n);
    rows
}
