//! Turn raw form text into typed records. Every desk runs these before it
//! touches a store, so a bad field can never reach the uniqueness check.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{StoreError, StoreResult};
use crate::models::{Book, Product, UserRecord};

/// Date format used by every library form.
pub const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";

const NUMBERS_MESSAGE: &str = "Invalid input! Quantity and Price must be numbers.";
const LINE_TOTAL_MESSAGE: &str = "Quantity times Price is too large.";

pub fn parse_product(name: &str, quantity: &str, price: &str) -> StoreResult<Product> {
    let quantity = quantity
        .trim()
        .parse::<i64>()
        .map_err(|_| StoreError::invalid(NUMBERS_MESSAGE))?;
    let price = Decimal::from_str(price.trim()).map_err(|_| StoreError::invalid(NUMBERS_MESSAGE))?;

    let name = required(name, "Product name cannot be empty.")?;
    if quantity < 0 {
        return Err(StoreError::invalid("Quantity cannot be negative."));
    }
    let quantity = u32::try_from(quantity).map_err(|_| StoreError::invalid("Quantity is too large."))?;
    if price < Decimal::ZERO {
        return Err(StoreError::invalid("Price cannot be negative."));
    }

    let product = Product::new(name, quantity, price);
    if product.checked_total().is_none() {
        return Err(StoreError::invalid(LINE_TOTAL_MESSAGE));
    }
    Ok(product)
}

pub fn parse_loan(
    name: &str,
    user_id: &str,
    book_name: &str,
    book_id: &str,
    start: &str,
) -> StoreResult<UserRecord> {
    let name = required(name, "User name is required.")?;
    let user_id = required(user_id, "User ID is required.")?;
    let book_name = required(book_name, "Book name is required.")?;
    let book_id = required(book_id, "Book ID is required.")?;
    let start = parse_date(start)?;
    Ok(UserRecord::new(name, user_id, book_name, book_id, start))
}

pub fn parse_book(title: &str, author: &str, book_id: &str) -> StoreResult<Book> {
    let title = required(title, "Book title is required.")?;
    let author = required(author, "Author is required.")?;
    let book_id = required(book_id, "Book ID is required.")?;
    Ok(Book::new(title, author, book_id))
}

pub fn parse_date(raw: &str) -> StoreResult<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(StoreError::invalid("Start date is required."));
    }
    NaiveDate::parse_from_str(raw, DATE_INPUT_FORMAT)
        .map_err(|_| StoreError::invalid("Start date must look like YYYY-MM-DD."))
}

fn required<'a>(value: &'a str, message: &str) -> StoreResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        Err(StoreError::invalid(message))
    } else {
        Ok(value)
    }
}
