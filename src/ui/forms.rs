use chrono::NaiveDate;
use crossterm::event::KeyCode;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Product, UserRecord};
use crate::validate::DATE_INPUT_FORMAT;

/// Describes one field set. Each form is a `Form<F>` over an enum listing its
/// fields in display order.
pub(crate) trait FormField: Copy + PartialEq + 'static {
    const ALL: &'static [Self];

    fn label(self) -> &'static str;

    /// Render the value as bullets (passwords).
    fn masked(self) -> bool {
        false
    }

    /// Whether a typed character is allowed in this field.
    fn accepts(self, ch: char) -> bool {
        !ch.is_control()
    }
}

/// What a keystroke did to a form.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum FormOutcome {
    Continue,
    Submit,
    Cancel,
}

/// Text-entry state shared by the login screen and every modal form.
#[derive(Clone)]
pub(crate) struct Form<F: FormField> {
    values: Vec<String>,
    active: F,
    pub(crate) error: Option<String>,
}

impl<F: FormField> Form<F> {
    pub(crate) fn new() -> Self {
        Self {
            values: vec![String::new(); F::ALL.len()],
            active: F::ALL[0],
            error: None,
        }
    }

    fn index(field: F) -> usize {
        F::ALL.iter().position(|f| *f == field).unwrap_or(0)
    }

    pub(crate) fn value(&self, field: F) -> &str {
        &self.values[Self::index(field)]
    }

    pub(crate) fn set(&mut self, field: F, value: impl Into<String>) {
        self.values[Self::index(field)] = value.into();
    }

    pub(crate) fn active(&self) -> F {
        self.active
    }

    /// Row of the active field inside the form, used to place the cursor.
    pub(crate) fn active_row(&self) -> usize {
        Self::index(self.active)
    }

    /// Move focus forward, wrapping to the first field.
    pub(crate) fn next_field(&mut self) {
        let next = (Self::index(self.active) + 1) % F::ALL.len();
        self.active = F::ALL[next];
    }

    /// Move focus backward, wrapping to the last field.
    pub(crate) fn previous_field(&mut self) {
        let len = F::ALL.len();
        let previous = (Self::index(self.active) + len - 1) % len;
        self.active = F::ALL[previous];
    }

    /// Append a character to the active field if the field accepts it.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if !self.active.accepts(ch) {
            return false;
        }
        let index = Self::index(self.active);
        self.values[index].push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        let index = Self::index(self.active);
        self.values[index].pop();
    }

    /// Apply the standard form bindings: Tab/arrows move focus, Enter
    /// submits, Esc cancels, anything printable is typed.
    pub(crate) fn handle_key(&mut self, code: KeyCode) -> FormOutcome {
        match code {
            KeyCode::Esc => return FormOutcome::Cancel,
            KeyCode::Enter => return FormOutcome::Submit,
            KeyCode::Tab | KeyCode::Down => self.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.previous_field(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Char(ch) => {
                if self.push_char(ch) {
                    self.error = None;
                }
            }
            _ => {}
        }
        FormOutcome::Continue
    }

    /// Render a single `Label: value` line.
    pub(crate) fn build_line(&self, field: F) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let display = if value.is_empty() {
            "<required>".to_string()
        } else if field.masked() {
            "•".repeat(value.chars().count())
        } else {
            value.to_string()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    /// Column where the cursor sits for the active field.
    pub(crate) fn cursor_offset(&self) -> u16 {
        let label = self.active.label().chars().count() + 2;
        (label + self.value(self.active).chars().count()) as u16
    }

    pub(crate) fn lines(&self) -> Vec<Line<'static>> {
        F::ALL.iter().map(|field| self.build_line(*field)).collect()
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum LoginField {
    Username,
    Password,
}

impl FormField for LoginField {
    const ALL: &'static [Self] = &[LoginField::Username, LoginField::Password];

    fn label(self) -> &'static str {
        match self {
            LoginField::Username => "Username",
            LoginField::Password => "Password",
        }
    }

    fn masked(self) -> bool {
        self == LoginField::Password
    }
}

pub(crate) type LoginForm = Form<LoginField>;

#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum ProductField {
    Name,
    Quantity,
    Price,
}

impl FormField for ProductField {
    const ALL: &'static [Self] = &[ProductField::Name, ProductField::Quantity, ProductField::Price];

    fn label(self) -> &'static str {
        match self {
            ProductField::Name => "Name",
            ProductField::Quantity => "Quantity",
            ProductField::Price => "Price",
        }
    }
}

pub(crate) type ProductForm = Form<ProductField>;

impl Form<ProductField> {
    /// Load the selected product into the form for editing.
    pub(crate) fn from_product(product: &Product) -> Self {
        let mut form = Self::new();
        form.set(ProductField::Name, product.name.clone());
        form.set(ProductField::Quantity, product.quantity.to_string());
        form.set(ProductField::Price, product.price.to_string());
        form
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum LoanField {
    Name,
    UserId,
    BookName,
    BookId,
    Start,
}

impl FormField for LoanField {
    const ALL: &'static [Self] = &[
        LoanField::Name,
        LoanField::UserId,
        LoanField::BookName,
        LoanField::BookId,
        LoanField::Start,
    ];

    fn label(self) -> &'static str {
        match self {
            LoanField::Name => "Name",
            LoanField::UserId => "User ID",
            LoanField::BookName => "Book Name",
            LoanField::BookId => "Book ID",
            LoanField::Start => "Start (YYYY-MM-DD)",
        }
    }

    fn accepts(self, ch: char) -> bool {
        match self {
            LoanField::Start => ch.is_ascii_digit() || ch == '-',
            _ => !ch.is_control(),
        }
    }
}

pub(crate) type LoanForm = Form<LoanField>;

impl Form<LoanField> {
    /// Blank loan form with the start date defaulting to today.
    pub(crate) fn starting_on(today: NaiveDate) -> Self {
        let mut form = Self::new();
        form.set(LoanField::Start, today.format(DATE_INPUT_FORMAT).to_string());
        form
    }

    pub(crate) fn from_loan(loan: &UserRecord) -> Self {
        let mut form = Self::new();
        form.set(LoanField::Name, loan.name.clone());
        form.set(LoanField::UserId, loan.user_id.clone());
        form.set(LoanField::BookName, loan.book_name.clone());
        form.set(LoanField::BookId, loan.book_id.clone());
        form.set(
            LoanField::Start,
            loan.start().format(DATE_INPUT_FORMAT).to_string(),
        );
        form
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum BookField {
    Title,
    Author,
    BookId,
}

impl FormField for BookField {
    const ALL: &'static [Self] = &[BookField::Title, BookField::Author, BookField::BookId];

    fn label(self) -> &'static str {
        match self {
            BookField::Title => "Title",
            BookField::Author => "Author",
            BookField::BookId => "Book ID",
        }
    }
}

pub(crate) type BookForm = Form<BookField>;

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn focus_wraps_both_ways() {
        let mut form = ProductForm::new();
        assert!(form.active() == ProductField::Name);
        form.previous_field();
        assert!(form.active() == ProductField::Price);
        form.next_field();
        assert!(form.active() == ProductField::Name);
    }

    #[test]
    fn typing_goes_to_the_active_field() {
        let mut form = ProductForm::new();
        for ch in "Pen".chars() {
            form.push_char(ch);
        }
        form.next_field();
        form.push_char('7');
        form.backspace();
        form.push_char('5');
        assert_eq!(form.value(ProductField::Name), "Pen");
        assert_eq!(form.value(ProductField::Quantity), "5");
        assert_eq!(form.cursor_offset(), "Quantity: 5".len() as u16);
    }

    #[test]
    fn editing_form_round_trips_the_selected_product() {
        let form = ProductForm::from_product(&Product::new("Pen", 10, Decimal::new(250, 2)));
        assert_eq!(form.value(ProductField::Price), "2.50");
        assert_eq!(form.value(ProductField::Quantity), "10");
    }

    #[test]
    fn start_date_only_takes_date_characters() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mut form = LoanForm::starting_on(today);
        assert_eq!(form.value(LoanField::Start), "2024-06-01");

        for _ in 0..4 {
            form.next_field();
        }
        assert!(!form.push_char('x'));
        assert!(form.push_char('-'));
    }

    #[test]
    fn key_bindings() {
        let mut form = BookForm::new();
        assert_eq!(form.handle_key(KeyCode::Char('D')), FormOutcome::Continue);
        assert_eq!(form.handle_key(KeyCode::Tab), FormOutcome::Continue);
        assert!(form.active() == BookField::Author);
        assert_eq!(form.handle_key(KeyCode::Enter), FormOutcome::Submit);
        assert_eq!(form.handle_key(KeyCode::Esc), FormOutcome::Cancel);
        assert_eq!(form.value(BookField::Title), "D");
    }

    #[test]
    fn password_is_masked() {
        let mut form = LoginForm::new();
        form.next_field();
        form.push_char('p');
        form.push_char('w');
        let rendered: String = form
            .build_line(LoginField::Password)
            .spans
            .iter()
            .map(|span| span.content.to_string())
            .collect();
        assert_eq!(rendered, "Password: ••");
    }
}
