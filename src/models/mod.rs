use serde::{Deserialize, Serialize};

/// Identifier of a book in books.csv / ratings.csv
pub type BookId = u32;

/// Identifier of a user in ratings.csv
pub type UserId = u32;

/// Placeholder title returned when a similarity query names an unknown book
pub const BOOK_NOT_FOUND: &str = "Book not found";

/// A catalog entry with its tags already merged in
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub book_id: BookId,
    pub goodreads_book_id: u32,
    pub title: Option<String>,
    pub authors: String,
    /// Space-joined tag names, empty when the book has no tags
    pub tag_name: String,
}

/// A single user rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Rating {
    pub user_id: UserId,
    pub book_id: BookId,
    pub rating: u8,
}

// ============================================================================
// CSV record types
// ============================================================================

/// Row of books.csv; columns not listed here are ignored
#[derive(Debug, Clone, Deserialize)]
pub struct BookRecord {
    pub book_id: BookId,
    pub goodreads_book_id: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Option<String>,
}

/// Row of tags.csv
#[derive(Debug, Clone, Deserialize)]
pub struct TagRecord {
    pub tag_id: u32,
    pub tag_name: String,
}

/// Row of book_tags.csv
#[derive(Debug, Clone, Deserialize)]
pub struct BookTagRecord {
    pub goodreads_book_id: u32,
    pub tag_id: u32,
}

// ============================================================================
// Result rows
// ============================================================================

/// Tabular result row shared by every recommendation mode
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookRow {
    pub title: String,
    pub authors: Option<String>,
    pub tag_name: Option<String>,
}

impl BookRow {
    /// The single row shown when a title lookup fails
    pub fn not_found() -> Self {
        Self {
            title: BOOK_NOT_FOUND.to_string(),
            authors: None,
            tag_name: None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.title == BOOK_NOT_FOUND && self.authors.is_none()
    }
}

impl From<&Book> for BookRow {
    fn from(book: &Book) -> Self {
        Self {
            title: book.title.clone().unwrap_or_default(),
            authors: Some(book.authors.clone()),
            tag_name: Some(book.tag_name.clone()),
        }
    }
}

/// Turns books into result rows, dropping rows identical to an earlier one
pub fn distinct_rows<'a>(books: impl IntoIterator<Item = &'a Book>) -> Vec<BookRow> {
    let mut seen = std::collections::HashSet::new();
    books
        .into_iter()
        .map(BookRow::from)
        .filter(|row| seen.insert(row.clone()))
        .collect()
}
