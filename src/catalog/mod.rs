//! Book catalog loading
//!
//! Reads the four CSV datasets and merges tag names onto books so that every
//! catalog row carries a single space-joined tag string.

use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::{
    error::{AppError, AppResult},
    models::{Book, BookId, BookRecord, BookTagRecord, Rating, TagRecord},
};

pub mod ratings;

pub use ratings::RatingTable;

pub const BOOKS_FILE: &str = "books.csv";
pub const RATINGS_FILE: &str = "ratings.csv";
pub const TAGS_FILE: &str = "tags.csv";
pub const BOOK_TAGS_FILE: &str = "book_tags.csv";

/// Immutable book catalog in file order
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    books: Vec<Book>,
    positions: HashMap<BookId, usize>,
}

impl Catalog {
    /// Loads books and ratings from `data_dir`
    ///
    /// Any missing or malformed file is an error; there is no partial load.
    pub fn load(data_dir: &Path) -> AppResult<(Catalog, RatingTable)> {
        let books: Vec<BookRecord> = read_csv(&data_dir.join(BOOKS_FILE))?;
        let ratings: Vec<Rating> = read_csv(&data_dir.join(RATINGS_FILE))?;
        let tags: Vec<TagRecord> = read_csv(&data_dir.join(TAGS_FILE))?;
        let book_tags: Vec<BookTagRecord> = read_csv(&data_dir.join(BOOK_TAGS_FILE))?;

        tracing::info!(
            books = books.len(),
            ratings = ratings.len(),
            tags = tags.len(),
            book_tags = book_tags.len(),
            "Loaded catalog files"
        );

        let catalog = Catalog::from_records(books, &tags, &book_tags)?;
        Ok((catalog, RatingTable::new(ratings)))
    }

    /// Builds the catalog by joining tag names onto books
    pub fn from_records(
        books: Vec<BookRecord>,
        tags: &[TagRecord],
        book_tags: &[BookTagRecord],
    ) -> AppResult<Self> {
        let tag_names: HashMap<u32, &str> = tags
            .iter()
            .map(|tag| (tag.tag_id, tag.tag_name.as_str()))
            .collect();

        // Links to unknown tags carry no name and are skipped
        let mut tag_text: HashMap<u32, Vec<&str>> = HashMap::new();
        for link in book_tags {
            if let Some(name) = tag_names.get(&link.tag_id) {
                tag_text.entry(link.goodreads_book_id).or_default().push(*name);
            }
        }

        let books = books
            .into_iter()
            .map(|record| Book {
                book_id: record.book_id,
                goodreads_book_id: record.goodreads_book_id,
                title: record.title,
                authors: record.authors.unwrap_or_default(),
                tag_name: tag_text
                    .get(&record.goodreads_book_id)
                    .map(|names| names.join(" "))
                    .unwrap_or_default(),
            })
            .collect();

        Self::new(books)
    }

    /// Wraps already merged books, rejecting duplicate book ids
    pub fn new(books: Vec<Book>) -> AppResult<Self> {
        let mut positions = HashMap::with_capacity(books.len());
        for (position, book) in books.iter().enumerate() {
            if positions.insert(book.book_id, position).is_some() {
                return Err(AppError::InvalidData(format!(
                    "duplicate book_id {} in catalog",
                    book.book_id
                )));
            }
        }
        Ok(Self { books, positions })
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn row(&self, position: usize) -> Option<&Book> {
        self.books.get(position)
    }

    pub fn by_id(&self, book_id: BookId) -> Option<&Book> {
        self.positions.get(&book_id).map(|&p| &self.books[p])
    }

    /// Distinct non-empty titles in catalog order
    pub fn titles(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.books
            .iter()
            .filter_map(|book| book.title.as_deref())
            .filter(|title| !title.is_empty() && seen.insert(*title))
            .collect()
    }

    /// Position of the first book whose title matches case-insensitively
    pub fn find_by_title(&self, title: &str) -> Option<usize> {
        let wanted = title.to_lowercase();
        self.books.iter().position(|book| {
            book.title
                .as_deref()
                .is_some_and(|t| t.to_lowercase() == wanted)
        })
    }

    /// Ids of every book matching one of `titles` case-insensitively, in catalog order
    pub fn resolve_titles<S: AsRef<str>>(&self, titles: &[S]) -> Vec<BookId> {
        let wanted: HashSet<String> = titles.iter().map(|t| t.as_ref().to_lowercase()).collect();
        let mut seen = HashSet::new();
        self.books
            .iter()
            .filter(|book| {
                book.title
                    .as_deref()
                    .is_some_and(|t| wanted.contains(&t.to_lowercase()))
            })
            .map(|book| book.book_id)
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

/// Reads every row of a headed CSV file
pub fn read_csv<T: DeserializeOwned>(path: &Path) -> AppResult<Vec<T>> {
    let file = path.display().to_string();
    let mut reader = csv::Reader::from_path(path).map_err(|source| AppError::Csv {
        file: file.clone(),
        source,
    })?;

    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|source| AppError::Csv { file, source })
}
