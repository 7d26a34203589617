use std::fs;

use chrono::{NaiveDate, NaiveDateTime};
use counter_desk::{BillingDesk, LibraryDesk, LoanInput, StoreError};
use rust_decimal::Decimal;
use tempfile::TempDir;
use testresult::TestResult;

fn at(hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(hour, 30, 15)
        .unwrap()
}

fn loan<'a>(user_id: &'a str, name: &'a str) -> LoanInput<'a> {
    LoanInput {
        name,
        user_id,
        book_name: "Dune",
        book_id: "B1",
        start: "2024-05-01",
    }
}

#[test]
fn bill_file_lists_every_product_and_the_grand_total() -> TestResult {
    let dir = TempDir::new()?;
    let mut desk = BillingDesk::new(dir.path());
    desk.add("Pen", "10", "2.5")?;
    desk.add("Book", "2", "20")?;

    desk.save(at(9))?;

    let bill = fs::read_to_string(dir.path().join("bill.txt"))?;
    assert!(bill.starts_with("======= BILL RECEIPT =======\nDate: 01-06-2024 09:30:15\n"));
    assert!(bill.contains("1     Pen             10         2.50       25.00"));
    assert!(bill.contains("2     Book            2          20.00      40.00"));
    assert!(bill.ends_with("Grand Total: ₹65.00\n============================\n"));
    Ok(())
}

#[test]
fn saving_twice_only_changes_the_date_line() -> TestResult {
    let dir = TempDir::new()?;
    let mut desk = BillingDesk::new(dir.path());
    desk.add("Pen", "10", "2.5")?;
    let path = dir.path().join("bill.txt");

    desk.save(at(9))?;
    let first = fs::read_to_string(&path)?;
    desk.save(at(17))?;
    let second = fs::read_to_string(&path)?;

    assert_ne!(first, second);
    let strip = |text: &str| {
        text.lines()
            .filter(|line| !line.starts_with("Date: "))
            .collect::<Vec<_>>()
            .join("\n")
    };
    assert_eq!(strip(&first), strip(&second));
    Ok(())
}

#[test]
fn unwritable_report_dir_keeps_the_bill_in_memory() -> TestResult {
    let dir = TempDir::new()?;
    let missing = dir.path().join("does-not-exist");
    let mut desk = BillingDesk::new(&missing);
    desk.add("Pen", "10", "2.5")?;

    let err = desk.save(at(9)).unwrap_err();
    assert!(matches!(err, StoreError::Io { ref path, .. } if path.ends_with("bill.txt")));
    assert_eq!(desk.products().len(), 1);
    assert_eq!(desk.total(), Decimal::new(25, 0));
    Ok(())
}

#[test]
fn books_file_is_rewritten_with_the_whole_catalog() -> TestResult {
    let dir = TempDir::new()?;
    let mut desk = LibraryDesk::new(dir.path());
    desk.add_book("Dune", "Frank Herbert", "B1")?;
    desk.save_books()?;
    desk.add_book("Emma", "Jane Austen", "B2")?;
    desk.save_books()?;

    let books = fs::read_to_string(dir.path().join("books.txt"))?;
    assert_eq!(
        books,
        "Title: Dune, Author: Frank Herbert, Book ID: B1\n\
         Title: Emma, Author: Jane Austen, Book ID: B2\n"
    );
    Ok(())
}

#[test]
fn each_duplicate_loan_appends_one_alert() -> TestResult {
    let dir = TempDir::new()?;
    let alerts = dir.path().join("admin_alerts.txt");
    fs::write(&alerts, "earlier alert\n")?;

    let mut desk = LibraryDesk::new(dir.path());
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    desk.add_loan(loan("U1", "Ravi"), today)?;

    let err = desk.add_loan(loan("u1", "Mina"), today).unwrap_err();
    assert!(matches!(err, StoreError::DuplicateKey { .. }));
    assert_eq!(desk.loans().len(), 1);

    let log = fs::read_to_string(&alerts)?;
    assert_eq!(log, "earlier alert\nDuplicate User ID: u1 by Mina on 2024-06-01\n");
    Ok(())
}

#[test]
fn duplicate_user_id_on_update_is_not_reported() -> TestResult {
    let dir = TempDir::new()?;
    let mut desk = LibraryDesk::new(dir.path());
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    desk.add_loan(loan("U1", "Ravi"), today)?;
    let mina = desk.add_loan(loan("U2", "Mina"), today)?;

    let err = desk.update_loan(Some(mina), loan("u1", "Mina")).unwrap_err();
    assert!(matches!(err, StoreError::DuplicateKey { .. }));
    assert_eq!(desk.loans().get(mina).map(|l| l.user_id.as_str()), Some("U2"));
    assert!(!desk.alerts_path().exists());
    Ok(())
}

#[test]
fn invalid_loans_never_touch_the_alert_log() -> TestResult {
    let dir = TempDir::new()?;
    let mut desk = LibraryDesk::new(dir.path());
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

    let blank = LoanInput {
        name: "",
        ..loan("U1", "Ravi")
    };
    assert!(matches!(
        desk.add_loan(blank, today),
        Err(StoreError::InvalidInput(_))
    ));
    assert!(!desk.alerts_path().exists());
    Ok(())
}

#[test]
fn overdue_follows_the_date_it_is_asked_for() -> TestResult {
    let dir = TempDir::new()?;
    let mut desk = LibraryDesk::new(dir.path());
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    desk.add_loan(loan("U1", "Ravi"), today)?;

    assert!(desk.overdue(today).is_empty());
    let later = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
    let overdue = desk.overdue(later);
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].record.user_id, "U1");
    Ok(())
}
