//! Values derived from a store's current contents. Both functions always look
//! at the whole store; an active search filter never changes the bill total.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{Product, UserRecord};
use crate::store::{Entry, RecordStore};

/// Sum of `quantity * price` over every product on the bill. Saturates
/// instead of panicking; see [`checked_grand_total`].
pub fn grand_total(store: &RecordStore<Product>) -> Decimal {
    store
        .all()
        .fold(Decimal::ZERO, |sum, entry| sum.saturating_add(entry.record.total()))
}

/// Grand total, or `None` when a line total or the sum overflows.
pub fn checked_grand_total(store: &RecordStore<Product>) -> Option<Decimal> {
    store.all().try_fold(Decimal::ZERO, |sum, entry| {
        sum.checked_add(entry.record.checked_total()?)
    })
}

/// Loans whose expiry lies strictly before `today`, in store order.
pub fn overdue(store: &RecordStore<UserRecord>, today: NaiveDate) -> Vec<Entry<'_, UserRecord>> {
    store
        .find(move |loan: &UserRecord| loan.is_overdue(today))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn overflowing_totals_saturate_instead_of_panicking() {
        let mut store = RecordStore::new();
        store.insert(Product::new("A", 1, Decimal::MAX)).unwrap();
        assert_eq!(checked_grand_total(&store), Some(Decimal::MAX));

        store.insert(Product::new("B", 1, Decimal::ONE)).unwrap();
        assert_eq!(checked_grand_total(&store), None);
        assert_eq!(grand_total(&store), Decimal::MAX);

        store.insert(Product::new("C", 2, Decimal::MAX)).unwrap();
        assert_eq!(grand_total(&store), Decimal::MAX);
    }

    #[test]
    fn grand_total_sums_line_totals() {
        let mut store = RecordStore::new();
        assert_eq!(grand_total(&store), Decimal::ZERO);

        store
            .insert(Product::new("Pen", 10, Decimal::new(25, 1)))
            .unwrap();
        store
            .insert(Product::new("Book", 2, Decimal::new(200, 1)))
            .unwrap();

        assert_eq!(grand_total(&store), Decimal::new(650, 1));
    }

    #[test]
    fn overdue_keeps_only_expired_loans_in_order() {
        let mut store = RecordStore::new();
        // Expiry is start + 1 month, so these expire on 2024-01-01, 2025-01-01
        // and 2024-05-30.
        store
            .insert(UserRecord::new("A", "U1", "Dune", "B1", date(2023, 12, 1)))
            .unwrap();
        store
            .insert(UserRecord::new("B", "U2", "Emma", "B2", date(2024, 12, 1)))
            .unwrap();
        store
            .insert(UserRecord::new("C", "U3", "Kim", "B3", date(2024, 4, 30)))
            .unwrap();

        let late: Vec<_> = overdue(&store, date(2024, 6, 1))
            .into_iter()
            .map(|entry| entry.record.user_id.as_str())
            .collect();
        assert_eq!(late, ["U1", "U3"]);
    }

    #[test]
    fn loan_expiring_today_is_not_overdue() {
        let mut store = RecordStore::new();
        store
            .insert(UserRecord::new("A", "U1", "Dune", "B1", date(2024, 5, 1)))
            .unwrap();
        assert!(overdue(&store, date(2024, 6, 1)).is_empty());
    }
}
