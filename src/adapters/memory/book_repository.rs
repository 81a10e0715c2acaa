use indexmap::IndexMap;
use std::sync::RwLock;

use super::poisoned;
use crate::domain::{Book, BookId};
use crate::ports::book_repository::{BookRepository, Result};

/// BookRepositoryのインメモリ実装
///
/// 登録順を保持するため `IndexMap` を使う。
#[derive(Debug, Default)]
pub struct InMemoryBookRepository {
    books: RwLock<IndexMap<BookId, Book>>,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BookRepository for InMemoryBookRepository {
    fn get(&self, book_id: BookId) -> Result<Option<Book>> {
        let books = self.books.read().map_err(poisoned)?;
        Ok(books.get(&book_id).cloned())
    }

    fn save(&self, book: Book) -> Result<()> {
        let mut books = self.books.write().map_err(poisoned)?;
        books.insert(book.id(), book);
        Ok(())
    }

    fn delete(&self, book_id: BookId) -> Result<bool> {
        let mut books = self.books.write().map_err(poisoned)?;
        Ok(books.shift_remove(&book_id).is_some())
    }

    fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        let books = self.books.read().map_err(poisoned)?;
        Ok(books.values().find(|book| book.isbn() == isbn).cloned())
    }

    fn list_all(&self) -> Result<Vec<Book>> {
        let books = self.books.read().map_err(poisoned)?;
        Ok(books.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewBook;
    use chrono::Utc;

    fn book(isbn: &str) -> Book {
        Book::create(
            NewBook {
                isbn: isbn.to_string(),
                title: "Dune".to_string(),
                author: "Frank Herbert".to_string(),
                category: "Science Fiction".to_string(),
                publication_year: 1965,
                total_copies: Some(2.into()),
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_save_get_and_replace() {
        let repo = InMemoryBookRepository::new();
        let mut book = book("isbn-1");
        repo.save(book.clone()).unwrap();
        assert_eq!(repo.get(book.id()).unwrap(), Some(book.clone()));

        book.borrow_copy().unwrap();
        repo.save(book.clone()).unwrap();
        let stored = repo.get(book.id()).unwrap().unwrap();
        assert_eq!(stored.available_copies(), 1);
        assert_eq!(repo.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_find_by_isbn_and_delete() {
        let repo = InMemoryBookRepository::new();
        let first = book("isbn-1");
        let second = book("isbn-2");
        repo.save(first.clone()).unwrap();
        repo.save(second.clone()).unwrap();

        assert_eq!(
            repo.find_by_isbn("isbn-2").unwrap().map(|b| b.id()),
            Some(second.id())
        );
        assert!(repo.find_by_isbn("isbn-3").unwrap().is_none());

        assert!(repo.delete(first.id()).unwrap());
        assert!(!repo.delete(first.id()).unwrap());
        assert_eq!(
            repo.list_all().unwrap().iter().map(Book::id).collect::<Vec<_>>(),
            vec![second.id()]
        );
    }
}
