use std::collections::{HashMap, HashSet};

use crate::models::{BookId, Rating, UserId};

/// Immutable list of ratings in file order
///
/// Per-user and distinct-id lookups are indexed once on construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingTable {
    ratings: Vec<Rating>,
    users: Vec<UserId>,
    books: Vec<BookId>,
    rated: HashMap<UserId, HashSet<BookId>>,
}

impl RatingTable {
    pub fn new(ratings: Vec<Rating>) -> Self {
        let mut users = Vec::new();
        let mut books = Vec::new();
        let mut seen_books = HashSet::new();
        let mut rated: HashMap<UserId, HashSet<BookId>> = HashMap::new();

        for rating in &ratings {
            let user_books = rated.entry(rating.user_id).or_insert_with(|| {
                users.push(rating.user_id);
                HashSet::new()
            });
            user_books.insert(rating.book_id);
            if seen_books.insert(rating.book_id) {
                books.push(rating.book_id);
            }
        }

        Self {
            ratings,
            users,
            books,
            rated,
        }
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rating> {
        self.ratings.iter()
    }

    /// Number of ratings per book
    pub fn counts(&self) -> HashMap<BookId, usize> {
        let mut counts = HashMap::new();
        for rating in &self.ratings {
            *counts.entry(rating.book_id).or_insert(0) += 1;
        }
        counts
    }

    /// Drops every rating of books that have `threshold` ratings or more
    ///
    /// Kept books keep all of their ratings, so filtering the result again
    /// with the same threshold is a no-op.
    pub fn without_outliers(&self, threshold: usize) -> RatingTable {
        let counts = self.counts();
        let ratings: Vec<Rating> = self
            .ratings
            .iter()
            .filter(|r| counts.get(&r.book_id).is_some_and(|&c| c < threshold))
            .copied()
            .collect();

        tracing::debug!(
            threshold,
            before = self.ratings.len(),
            after = ratings.len(),
            "Removed ratings of over-popular books"
        );

        RatingTable::new(ratings)
    }

    /// Distinct users in first-appearance order
    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    /// Distinct books in first-appearance order
    pub fn books(&self) -> &[BookId] {
        &self.books
    }

    pub fn has_user(&self, user_id: UserId) -> bool {
        self.rated.contains_key(&user_id)
    }

    /// Books the user has rated, `None` for users without ratings
    pub fn rated_by(&self, user_id: UserId) -> Option<&HashSet<BookId>> {
        self.rated.get(&user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(user_id: UserId, book_id: BookId, rating: u8) -> Rating {
        Rating {
            user_id,
            book_id,
            rating,
        }
    }

    fn sample() -> RatingTable {
        RatingTable::new(vec![
            rating(1, 10, 5),
            rating(2, 10, 4),
            rating(3, 10, 3),
            rating(1, 20, 2),
            rating(2, 30, 5),
            rating(3, 20, 4),
        ])
    }

    #[test]
    fn test_counts() {
        let counts = sample().counts();
        assert_eq!(counts[&10], 3);
        assert_eq!(counts[&20], 2);
        assert_eq!(counts[&30], 1);
    }

    #[test]
    fn test_without_outliers_drops_popular_books() {
        let filtered = sample().without_outliers(3);
        assert_eq!(filtered.len(), 3);
        assert!(filtered.iter().all(|r| r.book_id != 10));
    }

    #[test]
    fn test_without_outliers_is_idempotent() {
        let table = sample();
        for threshold in 0..5 {
            let once = table.without_outliers(threshold);
            let twice = once.without_outliers(threshold);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_users_and_books_first_appearance_order() {
        let table = sample();
        assert_eq!(table.users(), &[1, 2, 3]);
        assert_eq!(table.books(), &[10, 20, 30]);
    }

    #[test]
    fn test_filtered_table_rebuilds_lookups() {
        let filtered = sample().without_outliers(3);
        // Only books 20 and 30 survive; user 1 kept just book 20
        assert_eq!(filtered.books(), &[20, 30]);
        assert_eq!(filtered.users(), &[1, 2, 3]);
        assert_eq!(filtered.rated_by(1).unwrap().len(), 1);
        assert!(!filtered.rated_by(1).unwrap().contains(&10));
    }

    #[test]
    fn test_rated_by() {
        let table = sample();
        let rated = table.rated_by(1).unwrap();
        assert_eq!(rated.len(), 2);
        assert!(rated.contains(&10) && rated.contains(&20));
        assert!(table.rated_by(99).is_none());
        assert!(table.has_user(3));
        assert!(!table.has_user(99));
    }
}
