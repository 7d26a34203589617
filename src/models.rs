//! Domain models for both desks. They are plain value types: the store owns
//! them, the screens borrow them for rendering, and nothing here knows about
//! redraws or selection.

use std::fmt;

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;

use crate::search::Searchable;
use crate::store::Keyed;

/// A line on the bill. The name doubles as the unique key, so two lines can
/// never describe the same product with different casing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub name: String,
    pub quantity: u32,
    /// Unit price. Kept as a decimal so `2.50 * 10` is exactly `25.00`.
    pub price: Decimal,
}

impl Product {
    pub fn new(name: impl Into<String>, quantity: u32, price: Decimal) -> Self {
        Self {
            name: name.into(),
            quantity,
            price,
        }
    }

    /// Line total (`quantity * price`), or `None` when it does not fit in a
    /// `Decimal`.
    pub fn checked_total(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.price)
    }

    /// Line total (`quantity * price`). Saturates at `Decimal::MAX`; the
    /// desks reject products whose total would overflow.
    pub fn total(&self) -> Decimal {
        self.checked_total().unwrap_or(Decimal::MAX)
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Keyed for Product {
    fn key(&self) -> &str {
        &self.name
    }
}

impl Searchable for Product {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name]
    }
}

/// A library loan: who borrowed which book and until when.
///
/// `expiry` has no setter. It is derived from `start` at construction and
/// every time [`UserRecord::set_start`] runs, so it is always exactly one
/// calendar month later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub name: String,
    /// Unique key for the loans store.
    pub user_id: String,
    pub book_name: String,
    pub book_id: String,
    start: NaiveDate,
    expiry: NaiveDate,
}

impl UserRecord {
    pub fn new(
        name: impl Into<String>,
        user_id: impl Into<String>,
        book_name: impl Into<String>,
        book_id: impl Into<String>,
        start: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            user_id: user_id.into(),
            book_name: book_name.into(),
            book_id: book_id.into(),
            start,
            expiry: expiry_for(start),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn expiry(&self) -> NaiveDate {
        self.expiry
    }

    /// Move the loan start and recompute the expiry alongside it.
    pub fn set_start(&mut self, start: NaiveDate) {
        self.start = start;
        self.expiry = expiry_for(start);
    }

    /// A loan is overdue once its expiry lies strictly before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.expiry < today
    }
}

/// One calendar month after `start`, clamped to the end of the target month
/// (Jan 31 becomes Feb 28/29).
fn expiry_for(start: NaiveDate) -> NaiveDate {
    start
        .checked_add_months(Months::new(1))
        .unwrap_or(NaiveDate::MAX)
}

impl Keyed for UserRecord {
    fn key(&self) -> &str {
        &self.user_id
    }
}

impl Searchable for UserRecord {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.user_id, &self.book_name, &self.book_id]
    }
}

/// Catalog entry. Book ids are informational only; duplicates are allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub title: String,
    pub author: String,
    pub book_id: String,
}

impl Book {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        book_id: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            book_id: book_id.into(),
        }
    }
}

impl Searchable for Book {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.author, &self.book_id]
    }
}
