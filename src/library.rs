//! Headless library desk: loans keyed by user id, the append-only book
//! catalog, and the two files the desk maintains next to the reports.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::aggregate;
use crate::error::{StoreError, StoreResult};
use crate::models::{Book, UserRecord};
use crate::report::{self, ALERTS_FILE_NAME, BOOKS_FILE_NAME};
use crate::store::{Entry, RecordId, RecordStore};
use crate::validate::{parse_book, parse_loan};

#[derive(Debug)]
pub struct LibraryDesk {
    loans: RecordStore<UserRecord>,
    books: Vec<Book>,
    books_path: PathBuf,
    alerts_path: PathBuf,
}

/// Raw loan form text, in the order the form shows it.
#[derive(Debug, Clone, Copy)]
pub struct LoanInput<'a> {
    pub name: &'a str,
    pub user_id: &'a str,
    pub book_name: &'a str,
    pub book_id: &'a str,
    pub start: &'a str,
}

impl LibraryDesk {
    pub fn new(report_dir: &Path) -> Self {
        Self {
            loans: RecordStore::new(),
            books: Vec::new(),
            books_path: report_dir.join(BOOKS_FILE_NAME),
            alerts_path: report_dir.join(ALERTS_FILE_NAME),
        }
    }

    pub fn loans(&self) -> &RecordStore<UserRecord> {
        &self.loans
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn books_path(&self) -> &Path {
        &self.books_path
    }

    pub fn alerts_path(&self) -> &Path {
        &self.alerts_path
    }

    /// Register a new loan. A reused user id is rejected and, on top of the
    /// returned error, recorded in `admin_alerts.txt` dated `today`.
    pub fn add_loan(&mut self, input: LoanInput<'_>, today: NaiveDate) -> StoreResult<RecordId> {
        let loan = parse_loan(
            input.name,
            input.user_id,
            input.book_name,
            input.book_id,
            input.start,
        )
        .inspect_err(|err| warn!(%err, "loan rejected"))?;

        let user_id = loan.user_id.clone();
        let name = loan.name.clone();
        match self.loans.insert(loan) {
            Ok(id) => {
                info!(%user_id, "loan added");
                Ok(id)
            }
            Err(err @ StoreError::DuplicateKey { .. }) => {
                warn!(%user_id, %name, "duplicate user id");
                if let Err(alert_err) =
                    report::append_duplicate_alert(&self.alerts_path, &user_id, &name, today)
                {
                    error!(%alert_err, "duplicate user id was not recorded");
                }
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Overwrite the selected loan. Changing the start date moves the expiry
    /// with it because the record is rebuilt from the form.
    pub fn update_loan(
        &mut self,
        selected: Option<RecordId>,
        input: LoanInput<'_>,
    ) -> StoreResult<()> {
        let id = selected.ok_or(StoreError::NotFound)?;
        let loan = parse_loan(
            input.name,
            input.user_id,
            input.book_name,
            input.book_id,
            input.start,
        )
        .inspect_err(|err| warn!(%err, "loan update rejected"))?;
        self.loans
            .update(id, loan)
            .inspect_err(|err| warn!(%err, "loan update rejected"))?;
        info!(?id, "loan updated");
        Ok(())
    }

    pub fn delete_loan(&mut self, selected: Option<RecordId>) -> StoreResult<UserRecord> {
        let id = selected.ok_or(StoreError::NotFound)?;
        let loan = self.loans.delete(id)?;
        info!(user_id = %loan.user_id, "loan deleted");
        Ok(loan)
    }

    /// Loans past their expiry as of `today`, in store order.
    pub fn overdue(&self, today: NaiveDate) -> Vec<Entry<'_, UserRecord>> {
        aggregate::overdue(&self.loans, today)
    }

    /// Append a catalog entry. The catalog has no key, so only blank fields
    /// are rejected.
    pub fn add_book(&mut self, title: &str, author: &str, book_id: &str) -> StoreResult<()> {
        let book = parse_book(title, author, book_id)?;
        info!(title = %book.title, "book added to catalog");
        self.books.push(book);
        Ok(())
    }

    /// Overwrite `books.txt` with the whole catalog.
    pub fn save_books(&self) -> StoreResult<()> {
        report::write_books(&self.books_path, &self.books)
    }
}
