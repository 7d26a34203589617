//! Plain-text reports written on demand: the bill receipt, the book catalog
//! dump, and the append-only admin alert log.
//!
//! Rendering is kept separate from writing. Each report is rendered into a
//! `String` first, and only then is the target file truncated and written, so
//! a failure before the write leaves the previous file untouched.

use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{error, info};

use crate::error::{StoreError, StoreResult};
use crate::models::{Book, Product};
use crate::store::RecordStore;

pub const BILL_FILE_NAME: &str = "bill.txt";
pub const BOOKS_FILE_NAME: &str = "books.txt";
pub const ALERTS_FILE_NAME: &str = "admin_alerts.txt";

/// Timestamp format printed on the receipt.
pub const BILL_DATE_FORMAT: &str = "%d-%m-%Y %H:%M:%S";
/// Date format used by the library files.
pub const LIBRARY_DATE_FORMAT: &str = "%Y-%m-%d";

const RULE_WIDTH: usize = 56;

/// Two decimal places, half-up, no currency sign.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}

/// Amount with the rupee sign, as shown on screen and on the receipt.
pub fn format_rupees(amount: Decimal) -> String {
    format!("₹{}", format_amount(amount))
}

/// Render the receipt for the whole (unfiltered) bill. The output depends only
/// on the store contents and `at`.
pub fn render_bill(store: &RecordStore<Product>, at: NaiveDateTime) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "======= BILL RECEIPT =======");
    let _ = writeln!(out, "Date: {}", at.format(BILL_DATE_FORMAT));
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<5} {:<15} {:<10} {:<10} {:<10}",
        "S.No", "Product", "Quantity", "Price", "Total"
    );
    let _ = writeln!(out, "{rule}");

    let mut total = Decimal::ZERO;
    for (index, entry) in store.all().enumerate() {
        let product = entry.record;
        let line_total = product.total();
        let _ = writeln!(
            out,
            "{:<5} {:<15} {:<10} {:<10} {:<10}",
            index + 1,
            product.name,
            product.quantity,
            format_amount(product.price),
            format_amount(line_total)
        );
        total = total.saturating_add(line_total);
    }

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Grand Total: {}", format_rupees(total));
    let _ = writeln!(out, "============================");
    out
}

/// One `Title: .., Author: .., Book ID: ..` line per catalog entry.
pub fn render_books(books: &[Book]) -> String {
    books
        .iter()
        .map(|book| {
            format!(
                "Title: {}, Author: {}, Book ID: {}\n",
                book.title, book.author, book.book_id
            )
        })
        .collect()
}

/// Line appended to the alert log when a loan is rejected for reusing a
/// user id.
pub fn render_duplicate_alert(user_id: &str, name: &str, on: NaiveDate) -> String {
    format!(
        "Duplicate User ID: {user_id} by {name} on {}\n",
        on.format(LIBRARY_DATE_FORMAT)
    )
}

pub fn write_bill(path: &Path, store: &RecordStore<Product>, at: NaiveDateTime) -> StoreResult<()> {
    let contents = render_bill(store, at);
    overwrite(path, &contents)?;
    info!(path = %path.display(), lines = store.len(), "bill saved");
    Ok(())
}

pub fn write_books(path: &Path, books: &[Book]) -> StoreResult<()> {
    let contents = render_books(books);
    overwrite(path, &contents)?;
    info!(path = %path.display(), books = books.len(), "book catalog saved");
    Ok(())
}

pub fn append_duplicate_alert(
    path: &Path,
    user_id: &str,
    name: &str,
    on: NaiveDate,
) -> StoreResult<()> {
    let line = render_duplicate_alert(user_id, name, on);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut file| file.write_all(line.as_bytes()))
        .map_err(|err| {
            error!(path = %path.display(), %err, "failed to append admin alert");
            StoreError::io(path, err)
        })
}

fn overwrite(path: &Path, contents: &str) -> StoreResult<()> {
    fs::write(path, contents).map_err(|err| {
        error!(path = %path.display(), %err, "failed to write report");
        StoreError::io(path, err)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(9, 5, 7)
            .unwrap()
    }

    #[test]
    fn amounts_round_half_up() {
        assert_eq!(format_amount(Decimal::new(25, 1)), "2.50");
        assert_eq!(format_amount(Decimal::new(1005, 3)), "1.01");
        assert_eq!(format_amount(Decimal::ZERO), "0.00");
        assert_eq!(format_rupees(Decimal::new(65, 0)), "₹65.00");
    }

    #[test]
    fn bill_layout_matches_receipt_format() {
        let mut store = RecordStore::new();
        store
            .insert(Product::new("Pen", 10, Decimal::new(25, 1)))
            .unwrap();
        store
            .insert(Product::new("Book", 2, Decimal::new(20, 0)))
            .unwrap();

        let expected = concat!(
            "======= BILL RECEIPT =======\n",
            "Date: 01-06-2024 09:05:07\n",
            "\n",
            "S.No  Product         Quantity   Price      Total     \n",
            "--------------------------------------------------------\n",
            "1     Pen             10         2.50       25.00     \n",
            "2     Book            2          20.00      40.00     \n",
            "--------------------------------------------------------\n",
            "Grand Total: ₹65.00\n",
            "============================\n",
        );
        assert_eq!(render_bill(&store, at()), expected);
    }

    #[test]
    fn empty_bill_still_has_frame_and_zero_total() {
        let store = RecordStore::new();
        let bill = render_bill(&store, at());
        assert!(bill.contains("Grand Total: ₹0.00\n"));
        assert_eq!(bill.lines().count(), 8);
    }

    #[test]
    fn book_lines() {
        let books = vec![
            Book::new("Dune", "Frank Herbert", "B1"),
            Book::new("Emma", "Jane Austen", "B2"),
        ];
        assert_eq!(
            render_books(&books),
            "Title: Dune, Author: Frank Herbert, Book ID: B1\n\
             Title: Emma, Author: Jane Austen, Book ID: B2\n"
        );
    }

    #[test]
    fn alert_line() {
        let on = NaiveDate::from_ymd_opt(2024, 2, 3).unwrap();
        assert_eq!(
            render_duplicate_alert("U7", "Ravi", on),
            "Duplicate User ID: U7 by Ravi on 2024-02-03\n"
        );
    }
}
