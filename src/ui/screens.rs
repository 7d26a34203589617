use chrono::NaiveDate;

use crate::billing::BillingDesk;
use crate::library::LibraryDesk;
use crate::models::{Book, Product, UserRecord};
use crate::search::{filter_slice, filter_store};
use crate::store::{Entry, RecordId};

/// Move a record selection by `offset` rows within the visible ids, clamping
/// at both ends. With nothing selected the first step lands on the first or
/// last row depending on direction.
pub(crate) fn step_selection(
    visible: &[RecordId],
    current: Option<RecordId>,
    offset: isize,
) -> Option<RecordId> {
    if visible.is_empty() {
        return None;
    }
    let len = visible.len() as isize;
    let index = match current.and_then(|id| visible.iter().position(|v| *v == id)) {
        Some(index) => (index as isize + offset).clamp(0, len - 1),
        None if offset < 0 => len - 1,
        None => 0,
    };
    visible.get(index as usize).copied()
}

/// Billing desk plus the view state the table needs: the search keyword and
/// the selected row.
pub(crate) struct BillingScreen {
    pub(crate) desk: BillingDesk,
    pub(crate) filter: Option<String>,
    pub(crate) selected: Option<RecordId>,
}

impl BillingScreen {
    pub(crate) fn new(desk: BillingDesk) -> Self {
        Self {
            desk,
            filter: None,
            selected: None,
        }
    }

    /// Rows currently on screen, re-derived from the live store.
    pub(crate) fn visible(&self) -> Vec<Entry<'_, Product>> {
        filter_store(self.desk.products(), self.filter.as_deref())
    }

    fn visible_ids(&self) -> Vec<RecordId> {
        self.visible().iter().map(|entry| entry.id).collect()
    }

    pub(crate) fn selected_index(&self) -> Option<usize> {
        let id = self.selected?;
        self.visible().iter().position(|entry| entry.id == id)
    }

    pub(crate) fn current(&self) -> Option<&Product> {
        self.desk.products().get(self.selected?)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = step_selection(&self.visible_ids(), self.selected, offset);
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = self.visible_ids().first().copied();
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.visible_ids().last().copied();
    }

    pub(crate) fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Apply (or with `None`, reset) the search keyword. A selection that
    /// the new filter hides is dropped.
    pub(crate) fn set_filter(&mut self, filter: Option<String>) {
        self.filter = filter.filter(|q| !q.trim().is_empty());
        if self.selected_index().is_none() {
            self.selected = None;
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum LibraryTab {
    Loans,
    Overdue,
    Books,
}

impl LibraryTab {
    pub(crate) fn next(self) -> Self {
        match self {
            LibraryTab::Loans => LibraryTab::Overdue,
            LibraryTab::Overdue => LibraryTab::Books,
            LibraryTab::Books => LibraryTab::Loans,
        }
    }

    pub(crate) fn title(self) -> &'static str {
        match self {
            LibraryTab::Loans => "Loans",
            LibraryTab::Overdue => "Overdue",
            LibraryTab::Books => "Books",
        }
    }
}

/// Library desk plus tab, search and selection state.
pub(crate) struct LibraryScreen {
    pub(crate) desk: LibraryDesk,
    pub(crate) tab: LibraryTab,
    pub(crate) filter: Option<String>,
    pub(crate) selected: Option<RecordId>,
    pub(crate) book_cursor: usize,
    /// Date the overdue list was last requested for.
    pub(crate) overdue_as_of: NaiveDate,
}

impl LibraryScreen {
    pub(crate) fn new(desk: LibraryDesk, today: NaiveDate) -> Self {
        Self {
            desk,
            tab: LibraryTab::Loans,
            filter: None,
            selected: None,
            book_cursor: 0,
            overdue_as_of: today,
        }
    }

    /// Cycle to the next tab. Entering the overdue tab re-evaluates it
    /// against `today`.
    pub(crate) fn next_tab(&mut self, today: NaiveDate) {
        self.tab = self.tab.next();
        if self.tab == LibraryTab::Overdue {
            self.overdue_as_of = today;
        }
    }

    pub(crate) fn visible_loans(&self) -> Vec<Entry<'_, UserRecord>> {
        filter_store(self.desk.loans(), self.filter.as_deref())
    }

    pub(crate) fn overdue(&self) -> Vec<Entry<'_, UserRecord>> {
        self.desk.overdue(self.overdue_as_of)
    }

    pub(crate) fn visible_books(&self) -> Vec<&Book> {
        filter_slice(self.desk.books(), self.filter.as_deref())
    }

    pub(crate) fn selected_index(&self) -> Option<usize> {
        let id = self.selected?;
        self.visible_loans().iter().position(|entry| entry.id == id)
    }

    pub(crate) fn current_loan(&self) -> Option<&UserRecord> {
        self.desk.loans().get(self.selected?)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        match self.tab {
            LibraryTab::Loans => {
                let ids: Vec<RecordId> = self.visible_loans().iter().map(|e| e.id).collect();
                self.selected = step_selection(&ids, self.selected, offset);
            }
            LibraryTab::Books => {
                let len = self.visible_books().len() as isize;
                if len == 0 {
                    self.book_cursor = 0;
                    return;
                }
                let next = (self.book_cursor as isize + offset).clamp(0, len - 1);
                self.book_cursor = next as usize;
            }
            LibraryTab::Overdue => {}
        }
    }

    pub(crate) fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub(crate) fn set_filter(&mut self, filter: Option<String>) {
        self.filter = filter.filter(|q| !q.trim().is_empty());
        if self.selected_index().is_none() {
            self.selected = None;
        }
        let books = self.visible_books().len();
        if self.book_cursor >= books {
            self.book_cursor = books.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn screen() -> (BillingScreen, Vec<RecordId>) {
        let mut desk = BillingDesk::new(Path::new("."));
        let ids = vec![
            desk.add("Pen", "10", "2.5").unwrap(),
            desk.add("Notebook", "5", "3.0").unwrap(),
            desk.add("Pencil", "2", "1").unwrap(),
        ];
        (BillingScreen::new(desk), ids)
    }

    #[test]
    fn selection_steps_and_clamps() {
        let (mut screen, ids) = screen();
        screen.move_selection(1);
        assert_eq!(screen.selected, Some(ids[0]));
        screen.move_selection(5);
        assert_eq!(screen.selected, Some(ids[2]));
        screen.move_selection(-1);
        assert_eq!(screen.selected, Some(ids[1]));
        screen.select_first();
        assert_eq!(screen.selected_index(), Some(0));
    }

    #[test]
    fn filter_hides_selection_and_reset_restores_everything() {
        let (mut screen, ids) = screen();
        screen.selected = Some(ids[1]);

        screen.set_filter(Some("pen".into()));
        assert_eq!(screen.visible().len(), 2);
        assert_eq!(screen.selected, None);

        screen.select_last();
        let pencil = screen.selected;
        screen.desk.delete(pencil).unwrap();
        assert_eq!(screen.visible().len(), 1);

        screen.set_filter(None);
        let names: Vec<_> = screen
            .visible()
            .iter()
            .map(|entry| entry.record.name.clone())
            .collect();
        assert_eq!(names, ["Pen", "Notebook"]);
    }

    #[test]
    fn total_ignores_the_search_filter() {
        let (mut screen, _) = screen();
        screen.set_filter(Some("note".into()));
        assert_eq!(screen.visible().len(), 1);
        assert_eq!(screen.desk.total(), rust_decimal::Decimal::new(42, 0));
    }

    #[test]
    fn step_from_nothing_picks_an_end() {
        let (_, ids) = screen();
        assert_eq!(step_selection(&ids, None, -1), Some(ids[2]));
        assert_eq!(step_selection(&ids, None, 1), Some(ids[0]));
        assert_eq!(step_selection(&[], None, 1), None);
    }
}
