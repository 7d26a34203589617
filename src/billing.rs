//! Headless billing desk: the product store, its running total, and the
//! receipt on disk.

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::aggregate::grand_total;
use crate::error::{StoreError, StoreResult};
use crate::models::Product;
use crate::report::{self, BILL_FILE_NAME};
use crate::store::{RecordId, RecordStore};
use crate::validate::parse_product;

const TOTAL_TOO_LARGE: &str = "Total Bill is too large.";

#[derive(Debug)]
pub struct BillingDesk {
    products: RecordStore<Product>,
    total: Rc<Cell<Decimal>>,
    bill_path: PathBuf,
}

impl BillingDesk {
    /// Create an empty bill whose receipt is written to
    /// `report_dir/bill.txt`.
    pub fn new(report_dir: &Path) -> Self {
        let total = Rc::new(Cell::new(Decimal::ZERO));
        let mut products = RecordStore::new();
        {
            let total = Rc::clone(&total);
            products.subscribe(move |_, store: &RecordStore<Product>| {
                total.set(grand_total(store));
            });
        }
        Self {
            products,
            total,
            bill_path: report_dir.join(BILL_FILE_NAME),
        }
    }

    pub fn products(&self) -> &RecordStore<Product> {
        &self.products
    }

    /// Grand total over the whole bill, kept current by the store
    /// subscription.
    pub fn total(&self) -> Decimal {
        self.total.get()
    }

    pub fn bill_path(&self) -> &Path {
        &self.bill_path
    }

    /// Validate raw form input and append it as a new line.
    pub fn add(&mut self, name: &str, quantity: &str, price: &str) -> StoreResult<RecordId> {
        let product = parse_product(name, quantity, price).inspect_err(log_rejected)?;
        self.add_product(product)
    }

    pub fn add_product(&mut self, product: Product) -> StoreResult<RecordId> {
        self.check_total(Decimal::ZERO, &product)
            .inspect_err(log_rejected)?;
        let name = product.name.clone();
        let id = self.products.insert(product).inspect_err(log_rejected)?;
        info!(product = %name, total = %self.total(), "product added");
        Ok(id)
    }

    /// Overwrite the selected line with the parsed form input. A missing
    /// selection is reported as [`StoreError::NotFound`] before any parsing.
    pub fn update(
        &mut self,
        selected: Option<RecordId>,
        name: &str,
        quantity: &str,
        price: &str,
    ) -> StoreResult<()> {
        let id = selected.ok_or(StoreError::NotFound)?;
        let product = parse_product(name, quantity, price).inspect_err(log_rejected)?;
        if let Some(current) = self.products.get(id) {
            self.check_total(current.total(), &product)
                .inspect_err(log_rejected)?;
        }
        self.products.update(id, product).inspect_err(log_rejected)?;
        info!(?id, total = %self.total(), "product updated");
        Ok(())
    }

    pub fn delete(&mut self, selected: Option<RecordId>) -> StoreResult<Product> {
        let id = selected.ok_or(StoreError::NotFound)?;
        let product = self.products.delete(id)?;
        info!(product = %product.name, total = %self.total(), "product deleted");
        Ok(product)
    }

    /// Reject a change whose line total, or the bill total after swapping
    /// `replaced` for the new line, does not fit in a `Decimal`.
    fn check_total(&self, replaced: Decimal, product: &Product) -> StoreResult<()> {
        product
            .checked_total()
            .and_then(|line| (self.total() - replaced).checked_add(line))
            .map(|_| ())
            .ok_or_else(|| StoreError::invalid(TOTAL_TOO_LARGE))
    }

    /// Write the full, unfiltered bill to `bill.txt`, stamped with `at`.
    pub fn save(&self, at: NaiveDateTime) -> StoreResult<()> {
        report::write_bill(&self.bill_path, &self.products, at)
    }
}

fn log_rejected(err: &StoreError) {
    warn!(%err, "billing change rejected");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desk() -> BillingDesk {
        BillingDesk::new(Path::new("."))
    }

    #[test]
    fn total_tracks_every_mutation() {
        let mut desk = desk();
        let pen = desk.add("Pen", "10", "2.5").unwrap();
        assert_eq!(desk.total(), Decimal::new(25, 0));

        desk.add("Book", "2", "20.0").unwrap();
        assert_eq!(desk.total(), Decimal::new(65, 0));

        desk.update(Some(pen), "Pen", "4", "2.5").unwrap();
        assert_eq!(desk.total(), Decimal::new(50, 0));

        desk.delete(Some(pen)).unwrap();
        assert_eq!(desk.total(), Decimal::new(40, 0));
    }

    #[test]
    fn rejected_changes_leave_total_alone() {
        let mut desk = desk();
        let pen = desk.add("Pen", "10", "2.5").unwrap();

        assert!(matches!(
            desk.add("PEN", "1", "1"),
            Err(StoreError::DuplicateKey { .. })
        ));
        assert!(matches!(
            desk.add("Ink", "x", "1"),
            Err(StoreError::InvalidInput(_))
        ));
        assert!(matches!(
            desk.update(Some(pen), "Pen", "-2", "1"),
            Err(StoreError::InvalidInput(_))
        ));
        assert_eq!(desk.total(), Decimal::new(25, 0));
        assert_eq!(desk.products().len(), 1);
    }

    #[test]
    fn nothing_selected_is_not_found() {
        let mut desk = desk();
        desk.add("Pen", "10", "2.5").unwrap();

        assert!(matches!(desk.delete(None), Err(StoreError::NotFound)));
        assert!(matches!(
            desk.update(None, "Ink", "1", "1"),
            Err(StoreError::NotFound)
        ));
        assert_eq!(desk.products().len(), 1);
        assert_eq!(desk.total(), Decimal::new(25, 0));
    }

    #[test]
    fn oversized_line_total_is_rejected() {
        let mut desk = desk();
        let err = desk
            .add("Gold", "2", "79228162514264337593543950335")
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
        assert!(desk.products().is_empty());
        assert_eq!(desk.total(), Decimal::ZERO);
    }

    #[test]
    fn bill_total_overflow_is_rejected_before_the_store_changes() {
        let big = "50000000000000000000000000000";
        let mut desk = desk();
        let first = desk.add("A", "1", big).unwrap();

        assert!(matches!(
            desk.add("B", "1", big),
            Err(StoreError::InvalidInput(ref message)) if message == TOTAL_TOO_LARGE
        ));
        assert_eq!(desk.products().len(), 1);

        let second = desk.add("B", "1", "1").unwrap();
        assert!(matches!(
            desk.update(Some(second), "B", "1", big),
            Err(StoreError::InvalidInput(_))
        ));
        assert_eq!(desk.products().get(second).map(|p| p.price), Some(Decimal::ONE));

        desk.update(Some(first), "A", "1", "2").unwrap();
        assert_eq!(desk.total(), Decimal::new(3, 0));
    }

    #[test]
    fn blank_duplicate_is_invalid_not_duplicate() {
        let mut desk = desk();
        desk.add("Pen", "1", "1").unwrap();
        assert!(matches!(
            desk.add("  ", "1", "1"),
            Err(StoreError::InvalidInput(_))
        ));
    }
}
