use std::mem;
use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};
use crossterm::event::KeyCode;
use open::that as open_path;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap};
use ratatui::Frame;
use tracing::{info, warn};

use crate::auth::CredentialVerifier;
use crate::billing::BillingDesk;
use crate::config::{Config, DeskKind};
use crate::error::StoreError;
use crate::library::{LibraryDesk, LoanInput};
use crate::models::UserRecord;
use crate::report::{format_amount, format_rupees, BILL_DATE_FORMAT, LIBRARY_DATE_FORMAT};
use crate::store::{Entry, RecordId};

use super::forms::{
    BookField, BookForm, Form, FormField, FormOutcome, LoanField, LoanForm, LoginField, LoginForm,
    ProductField, ProductForm,
};
use super::helpers::{centered_rect, describe_error, Action, Subject};
use super::screens::{BillingScreen, LibraryScreen, LibraryTab};

/// Title bar with the desk name and the clock.
const HEADER_HEIGHT: u16 = 3;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows jumped by PageUp/PageDown.
const PAGE: isize = 5;

/// Top-level navigation. The login screen always comes first; which desk
/// follows is fixed by the command line.
enum Screen {
    Login(LoginForm),
    Billing(BillingScreen),
    Library(LibraryScreen),
}

/// Fine-grained modes scoped to the current screen. `editing` is the record
/// the form was loaded from, or `None` when adding.
enum Mode {
    Normal,
    ProductForm {
        editing: Option<RecordId>,
        form: ProductForm,
    },
    LoanForm {
        editing: Option<RecordId>,
        form: LoanForm,
    },
    BookForm(BookForm),
    Searching(SearchState),
}

/// State for an active inline search.
struct SearchState {
    query: String,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    verifier: Box<dyn CredentialVerifier>,
    desk: DeskKind,
    report_dir: PathBuf,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
    last_report: Option<PathBuf>,
    clock: NaiveDateTime,
}

impl App {
    pub fn new(config: &Config, verifier: Box<dyn CredentialVerifier>) -> Self {
        Self {
            verifier,
            desk: config.desk,
            report_dir: config.report_dir.clone(),
            screen: Screen::Login(LoginForm::new()),
            mode: Mode::Normal,
            status: None,
            last_report: None,
            clock: Local::now().naive_local(),
        }
    }

    /// Periodic refresh driven by the terminal loop. Only the header clock
    /// reads this; the desks never do.
    pub fn tick(&mut self, now: NaiveDateTime) {
        self.clock = now;
    }

    /// Route a key press to the active mode. Returns `true` when the user
    /// asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::ProductForm { editing, form } => self.handle_product_form(code, editing, form),
            Mode::LoanForm { editing, form } => self.handle_loan_form(code, editing, form),
            Mode::BookForm(form) => self.handle_book_form(code, form),
            Mode::Searching(state) => self.handle_search(code, state),
        };

        exit
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match self.screen {
            Screen::Login(_) => self.handle_login_key(code, exit),
            Screen::Billing(_) => self.handle_billing_key(code, exit),
            Screen::Library(_) => self.handle_library_key(code, exit),
        }
    }

    fn handle_login_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        let Screen::Login(form) = &mut self.screen else {
            return Mode::Normal;
        };

        match form.handle_key(code) {
            FormOutcome::Cancel => *exit = true,
            FormOutcome::Submit => {
                let username = form.value(LoginField::Username).to_string();
                let accepted = self
                    .verifier
                    .verify(&username, form.value(LoginField::Password));
                if accepted {
                    info!(%username, desk = ?self.desk, "login succeeded");
                    self.open_desk();
                    self.set_status(format!("Welcome, {username}."), StatusKind::Info);
                } else {
                    warn!(%username, "login rejected");
                    form.set(LoginField::Password, "");
                    form.error = Some("Invalid username or password.".to_string());
                    self.set_status("Invalid username or password.", StatusKind::Error);
                }
            }
            FormOutcome::Continue => {}
        }
        Mode::Normal
    }

    fn open_desk(&mut self) {
        self.screen = match self.desk {
            DeskKind::Billing => Screen::Billing(BillingScreen::new(BillingDesk::new(
                &self.report_dir,
            ))),
            DeskKind::Library => Screen::Library(LibraryScreen::new(
                LibraryDesk::new(&self.report_dir),
                self.clock.date(),
            )),
        };
    }

    fn handle_billing_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        let Screen::Billing(billing) = &mut self.screen else {
            return Mode::Normal;
        };
        let mut status: Option<(String, StatusKind)> = None;
        let mut open_report = false;

        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc => billing.clear_selection(),
            KeyCode::Up => billing.move_selection(-1),
            KeyCode::Down => billing.move_selection(1),
            KeyCode::PageUp => billing.move_selection(-PAGE),
            KeyCode::PageDown => billing.move_selection(PAGE),
            KeyCode::Home => billing.select_first(),
            KeyCode::End => billing.select_last(),
            KeyCode::Char('+') | KeyCode::Char('a') => {
                return Mode::ProductForm {
                    editing: None,
                    form: ProductForm::new(),
                };
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                if let (Some(id), Some(product)) = (billing.selected, billing.current()) {
                    return Mode::ProductForm {
                        editing: Some(id),
                        form: ProductForm::from_product(product),
                    };
                }
                status = Some((
                    describe_error(Subject::Product, Action::Update, &StoreError::NotFound),
                    StatusKind::Error,
                ));
            }
            KeyCode::Char('-') | KeyCode::Char('d') => {
                status = Some(match billing.desk.delete(billing.selected) {
                    Ok(product) => {
                        billing.clear_selection();
                        (
                            format!(
                                "Removed {}. Total Bill: {}",
                                product.name,
                                format_rupees(billing.desk.total())
                            ),
                            StatusKind::Info,
                        )
                    }
                    Err(err) => (
                        describe_error(Subject::Product, Action::Delete, &err),
                        StatusKind::Error,
                    ),
                });
            }
            KeyCode::Char('f') | KeyCode::Char('/') => {
                return Mode::Searching(SearchState {
                    query: billing.filter.clone().unwrap_or_default(),
                });
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                billing.set_filter(None);
                status = Some(("Showing all products.".to_string(), StatusKind::Info));
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                let path = billing.desk.bill_path().to_path_buf();
                status = Some(match billing.desk.save(Local::now().naive_local()) {
                    Ok(()) => {
                        let message = format!("Bill saved to '{}'", path.display());
                        self.last_report = Some(path);
                        (message, StatusKind::Info)
                    }
                    Err(err) => (
                        describe_error(Subject::Product, Action::Save, &err),
                        StatusKind::Error,
                    ),
                });
            }
            KeyCode::Char('o') | KeyCode::Char('O') => open_report = true,
            _ => {}
        }

        if let Some((text, kind)) = status {
            self.set_status(text, kind);
        }
        if open_report {
            self.open_last_report();
        }
        Mode::Normal
    }

    fn handle_library_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        let today = self.clock.date();
        let Screen::Library(library) = &mut self.screen else {
            return Mode::Normal;
        };
        let mut status: Option<(String, StatusKind)> = None;
        let mut open_report = false;

        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc => library.clear_selection(),
            KeyCode::Tab => {
                library.next_tab(today);
                if library.tab == LibraryTab::Overdue {
                    let count = library.overdue().len();
                    status = Some((
                        format!("{count} overdue loan(s) as of {}.", today.format(LIBRARY_DATE_FORMAT)),
                        StatusKind::Info,
                    ));
                }
            }
            KeyCode::Up => library.move_selection(-1),
            KeyCode::Down => library.move_selection(1),
            KeyCode::PageUp => library.move_selection(-PAGE),
            KeyCode::PageDown => library.move_selection(PAGE),
            KeyCode::Char('+') | KeyCode::Char('a') => match library.tab {
                LibraryTab::Loans => {
                    return Mode::LoanForm {
                        editing: None,
                        form: LoanForm::starting_on(today),
                    };
                }
                LibraryTab::Books => return Mode::BookForm(BookForm::new()),
                LibraryTab::Overdue => {}
            },
            KeyCode::Char('e') | KeyCode::Char('E') if library.tab == LibraryTab::Loans => {
                if let (Some(id), Some(loan)) = (library.selected, library.current_loan()) {
                    return Mode::LoanForm {
                        editing: Some(id),
                        form: LoanForm::from_loan(loan),
                    };
                }
                status = Some((
                    describe_error(Subject::Loan, Action::Update, &StoreError::NotFound),
                    StatusKind::Error,
                ));
            }
            KeyCode::Char('-') | KeyCode::Char('d') if library.tab == LibraryTab::Loans => {
                status = Some(match library.desk.delete_loan(library.selected) {
                    Ok(loan) => {
                        library.clear_selection();
                        (
                            format!("Removed loan for {}.", loan.user_id),
                            StatusKind::Info,
                        )
                    }
                    Err(err) => (
                        describe_error(Subject::Loan, Action::Delete, &err),
                        StatusKind::Error,
                    ),
                });
            }
            KeyCode::Char('f') | KeyCode::Char('/') if library.tab != LibraryTab::Overdue => {
                return Mode::Searching(SearchState {
                    query: library.filter.clone().unwrap_or_default(),
                });
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                library.set_filter(None);
                status = Some(("Search cleared.".to_string(), StatusKind::Info));
            }
            KeyCode::Char('s') | KeyCode::Char('S') if library.tab == LibraryTab::Books => {
                let path = library.desk.books_path().to_path_buf();
                status = Some(match library.desk.save_books() {
                    Ok(()) => {
                        let message = format!("Books saved to '{}'", path.display());
                        self.last_report = Some(path);
                        (message, StatusKind::Info)
                    }
                    Err(err) => (
                        describe_error(Subject::Book, Action::Save, &err),
                        StatusKind::Error,
                    ),
                });
            }
            KeyCode::Char('o') | KeyCode::Char('O') => open_report = true,
            _ => {}
        }

        if let Some((text, kind)) = status {
            self.set_status(text, kind);
        }
        if open_report {
            self.open_last_report();
        }
        Mode::Normal
    }

    fn handle_product_form(
        &mut self,
        code: KeyCode,
        editing: Option<RecordId>,
        mut form: ProductForm,
    ) -> Mode {
        match form.handle_key(code) {
            FormOutcome::Continue => Mode::ProductForm { editing, form },
            FormOutcome::Cancel => {
                self.set_status("Cancelled.", StatusKind::Info);
                Mode::Normal
            }
            FormOutcome::Submit => match self.submit_product(editing, &form) {
                Ok(message) => {
                    self.set_status(message, StatusKind::Info);
                    Mode::Normal
                }
                Err(message) => {
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                    Mode::ProductForm { editing, form }
                }
            },
        }
    }

    fn handle_loan_form(
        &mut self,
        code: KeyCode,
        editing: Option<RecordId>,
        mut form: LoanForm,
    ) -> Mode {
        match form.handle_key(code) {
            FormOutcome::Continue => Mode::LoanForm { editing, form },
            FormOutcome::Cancel => {
                self.set_status("Cancelled.", StatusKind::Info);
                Mode::Normal
            }
            FormOutcome::Submit => match self.submit_loan(editing, &form) {
                Ok(message) => {
                    self.set_status(message, StatusKind::Info);
                    Mode::Normal
                }
                Err(message) => {
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                    Mode::LoanForm { editing, form }
                }
            },
        }
    }

    fn handle_book_form(&mut self, code: KeyCode, mut form: BookForm) -> Mode {
        match form.handle_key(code) {
            FormOutcome::Continue => Mode::BookForm(form),
            FormOutcome::Cancel => {
                self.set_status("Cancelled.", StatusKind::Info);
                Mode::Normal
            }
            FormOutcome::Submit => match self.submit_book(&form) {
                Ok(message) => {
                    self.set_status(message, StatusKind::Info);
                    Mode::Normal
                }
                Err(message) => {
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                    Mode::BookForm(form)
                }
            },
        }
    }

    /// Live search: every keystroke re-filters the current list. Enter keeps
    /// the filter, Esc resets it.
    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Mode {
        match code {
            KeyCode::Esc => {
                self.apply_filter(None);
                self.set_status("Search cleared.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Enter => {
                if state.query.trim().is_empty() {
                    self.clear_status();
                } else {
                    self.set_status(
                        format!("Filtered by '{}'. Press r to reset.", state.query.trim()),
                        StatusKind::Info,
                    );
                }
                return Mode::Normal;
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Backspace => {
                state.query.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => state.query.push(ch),
            _ => {}
        }

        self.apply_filter(Some(state.query.clone()));
        Mode::Searching(state)
    }

    fn apply_filter(&mut self, filter: Option<String>) {
        match &mut self.screen {
            Screen::Billing(billing) => billing.set_filter(filter),
            Screen::Library(library) => library.set_filter(filter),
            Screen::Login(_) => {}
        }
    }

    fn move_selection(&mut self, offset: isize) {
        match &mut self.screen {
            Screen::Billing(billing) => billing.move_selection(offset),
            Screen::Library(library) => library.move_selection(offset),
            Screen::Login(_) => {}
        }
    }

    fn submit_product(
        &mut self,
        editing: Option<RecordId>,
        form: &ProductForm,
    ) -> Result<String, String> {
        let Screen::Billing(billing) = &mut self.screen else {
            return Err("The billing desk is not open.".to_string());
        };
        let name = form.value(ProductField::Name);
        let quantity = form.value(ProductField::Quantity);
        let price = form.value(ProductField::Price);

        let (action, verb) = match editing {
            None => (Action::Add, "Added"),
            Some(_) => (Action::Update, "Updated"),
        };
        let result = match editing {
            None => billing.desk.add(name, quantity, price).map(|_| ()),
            Some(id) => billing.desk.update(Some(id), name, quantity, price),
        };
        result.map_err(|err| describe_error(Subject::Product, action, &err))?;

        billing.clear_selection();
        Ok(format!(
            "{verb} {}. Total Bill: {}",
            name.trim(),
            format_rupees(billing.desk.total())
        ))
    }

    fn submit_loan(&mut self, editing: Option<RecordId>, form: &LoanForm) -> Result<String, String> {
        let today = self.clock.date();
        let Screen::Library(library) = &mut self.screen else {
            return Err("The library desk is not open.".to_string());
        };
        let input = LoanInput {
            name: form.value(LoanField::Name),
            user_id: form.value(LoanField::UserId),
            book_name: form.value(LoanField::BookName),
            book_id: form.value(LoanField::BookId),
            start: form.value(LoanField::Start),
        };

        let (action, verb) = match editing {
            None => (Action::Add, "Added"),
            Some(_) => (Action::Update, "Updated"),
        };
        let result = match editing {
            None => library.desk.add_loan(input, today).map(|_| ()),
            Some(id) => library.desk.update_loan(Some(id), input),
        };
        result.map_err(|err| describe_error(Subject::Loan, action, &err))?;

        library.clear_selection();
        Ok(format!("{verb} loan for {}.", input.user_id.trim()))
    }

    fn submit_book(&mut self, form: &BookForm) -> Result<String, String> {
        let Screen::Library(library) = &mut self.screen else {
            return Err("The library desk is not open.".to_string());
        };
        let title = form.value(BookField::Title);
        library
            .desk
            .add_book(title, form.value(BookField::Author), form.value(BookField::BookId))
            .map_err(|err| describe_error(Subject::Book, Action::Add, &err))?;
        Ok(format!("Added '{}' to the catalog.", title.trim()))
    }

    fn open_last_report(&mut self) {
        let Some(path) = self.last_report.clone() else {
            self.set_status("Nothing saved yet. Press s to save first.", StatusKind::Error);
            return;
        };
        match open_path(&path) {
            Ok(()) => self.set_status(format!("Opened {}.", path.display()), StatusKind::Info),
            Err(err) => {
                warn!(path = %path.display(), %err, "failed to open report");
                self.set_status(format!("Failed to open report: {err}"), StatusKind::Error)
            }
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_header(frame, chunks[0]);
        match &self.screen {
            Screen::Login(form) => self.draw_form(frame, chunks[1], "Login", form),
            Screen::Billing(billing) => self.draw_billing(frame, chunks[1], billing),
            Screen::Library(library) => self.draw_library(frame, chunks[1], library),
        }
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::ProductForm { editing, form } => {
                let title = if editing.is_some() {
                    "Update Product"
                } else {
                    "Add Product"
                };
                self.draw_form(frame, area, title, form);
            }
            Mode::LoanForm { editing, form } => {
                let title = if editing.is_some() {
                    "Update Loan"
                } else {
                    "Add Loan"
                };
                self.draw_form(frame, area, title, form);
            }
            Mode::BookForm(form) => self.draw_form(frame, area, "Add Book", form),
            Mode::Searching(state) => self.draw_search_bar(frame, chunks[1], state),
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let title = match (&self.screen, self.desk) {
            (Screen::Login(_), _) => "Login",
            (_, DeskKind::Billing) => "Product Billing System",
            (_, DeskKind::Library) => "Library Management",
        };
        let block = Block::default().borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(28)])
            .split(inner);

        let title = Paragraph::new(Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(title, columns[0]);

        let clock = Paragraph::new(Span::styled(
            format!("Date: {}", self.clock.format(BILL_DATE_FORMAT)),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Right);
        frame.render_widget(clock, columns[1]);
    }

    fn draw_billing(&self, frame: &mut Frame, area: Rect, billing: &BillingScreen) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(area);

        let title = match &billing.filter {
            Some(query) => format!("Products • search: '{query}'"),
            None => "Products".to_string(),
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        let visible = billing.visible();

        if visible.is_empty() {
            let text = if billing.desk.products().is_empty() {
                "No products yet. Press '+' to add one."
            } else {
                "No products match the current search."
            };
            let message = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, chunks[0]);
        } else {
            let rows = visible.iter().enumerate().map(|(index, entry)| {
                let product = entry.record;
                Row::new(vec![
                    (index + 1).to_string(),
                    product.name.clone(),
                    product.quantity.to_string(),
                    format_amount(product.price),
                    format_amount(product.total()),
                ])
            });
            let widths = [
                Constraint::Length(6),
                Constraint::Min(15),
                Constraint::Length(10),
                Constraint::Length(12),
                Constraint::Length(12),
            ];
            let table = Table::new(rows, widths)
                .header(header_row(["S.No", "Name", "Quantity", "Price", "Total"]))
                .block(block)
                .row_highlight_style(highlight_style())
                .highlight_symbol("▶ ");
            let mut state = TableState::default().with_selected(billing.selected_index());
            frame.render_stateful_widget(table, chunks[0], &mut state);
        }

        let total = Paragraph::new(Span::styled(
            format!("Total Bill: {}", format_rupees(billing.desk.total())),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Right);
        frame.render_widget(total, chunks[1]);
    }

    fn draw_library(&self, frame: &mut Frame, area: Rect, library: &LibraryScreen) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let tabs = [LibraryTab::Loans, LibraryTab::Overdue, LibraryTab::Books];
        let selected = tabs.iter().position(|tab| *tab == library.tab).unwrap_or(0);
        let tabs = Tabs::new(tabs.iter().map(|tab| tab.title()).collect::<Vec<_>>())
            .block(Block::default().borders(Borders::ALL))
            .select(selected)
            .highlight_style(highlight_style());
        frame.render_widget(tabs, chunks[0]);

        let filter_suffix = library
            .filter
            .as_ref()
            .map(|query| format!(" • search: '{query}'"))
            .unwrap_or_default();

        match library.tab {
            LibraryTab::Loans => {
                let loans = library.visible_loans();
                let block = Block::default()
                    .title(format!("Loans{filter_suffix}"))
                    .borders(Borders::ALL);
                if loans.is_empty() {
                    let text = if library.desk.loans().is_empty() {
                        "No loans yet. Press '+' to add one."
                    } else {
                        "No loans match the current search."
                    };
                    render_message(frame, chunks[1], block, text);
                    return;
                }
                let table = loan_table(&loans, block);
                let mut state = TableState::default().with_selected(library.selected_index());
                frame.render_stateful_widget(table, chunks[1], &mut state);
            }
            LibraryTab::Overdue => {
                let overdue = library.overdue();
                let block = Block::default()
                    .title(format!(
                        "Overdue as of {}",
                        library.overdue_as_of.format(LIBRARY_DATE_FORMAT)
                    ))
                    .borders(Borders::ALL);
                if overdue.is_empty() {
                    render_message(frame, chunks[1], block, "No overdue loans.");
                    return;
                }
                frame.render_widget(loan_table(&overdue, block), chunks[1]);
            }
            LibraryTab::Books => {
                let books = library.visible_books();
                let block = Block::default()
                    .title(format!("Books{filter_suffix}"))
                    .borders(Borders::ALL);
                if books.is_empty() {
                    let text = if library.desk.books().is_empty() {
                        "No books yet. Press '+' to add one."
                    } else {
                        "No books match the current search."
                    };
                    render_message(frame, chunks[1], block, text);
                    return;
                }
                let rows = books.iter().enumerate().map(|(index, book)| {
                    Row::new(vec![
                        (index + 1).to_string(),
                        book.title.clone(),
                        book.author.clone(),
                        book.book_id.clone(),
                    ])
                });
                let widths = [
                    Constraint::Length(6),
                    Constraint::Percentage(40),
                    Constraint::Percentage(35),
                    Constraint::Min(8),
                ];
                let table = Table::new(rows, widths)
                    .header(header_row(["S.No", "Title", "Author", "Book ID"]))
                    .block(block)
                    .row_highlight_style(highlight_style())
                    .highlight_symbol("▶ ");
                let mut state = TableState::default().with_selected(Some(library.book_cursor));
                frame.render_stateful_widget(table, chunks[1], &mut state);
            }
        }
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Search");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Search: ".len() as u16 + state.query.chars().count() as u16;
        let cursor_y = inner.y;
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&'static str, &'static str)] = match (&self.screen, &self.mode) {
            (_, Mode::Searching(_)) => &[
                ("[↑↓]", "Select"),
                ("[Enter]", "Keep Filter"),
                ("[Esc]", "Reset"),
            ],
            (_, Mode::ProductForm { .. } | Mode::LoanForm { .. } | Mode::BookForm(_)) => &[
                ("[Tab]", "Next Field"),
                ("[Enter]", "Save"),
                ("[Esc]", "Cancel"),
            ],
            (Screen::Login(_), _) => &[
                ("[Tab]", "Next Field"),
                ("[Enter]", "Login"),
                ("[Esc]", "Exit"),
            ],
            (Screen::Billing(_), _) => &[
                ("[↑↓]", "Select"),
                ("[+]", "Add"),
                ("[e]", "Update"),
                ("[-]", "Delete"),
                ("[f]", "Search"),
                ("[r]", "Reset"),
                ("[s]", "Save Bill"),
                ("[o]", "Open Bill"),
                ("[q]", "Exit"),
            ],
            (Screen::Library(library), _) => match library.tab {
                LibraryTab::Loans => &[
                    ("[Tab]", "Next Tab"),
                    ("[↑↓]", "Select"),
                    ("[+]", "Add"),
                    ("[e]", "Update"),
                    ("[-]", "Delete"),
                    ("[f]", "Search"),
                    ("[r]", "Reset"),
                    ("[q]", "Exit"),
                ],
                LibraryTab::Overdue => &[("[Tab]", "Next Tab"), ("[q]", "Exit")],
                LibraryTab::Books => &[
                    ("[Tab]", "Next Tab"),
                    ("[↑↓]", "Select"),
                    ("[+]", "Add"),
                    ("[f]", "Search"),
                    ("[r]", "Reset"),
                    ("[s]", "Save Books"),
                    ("[o]", "Open File"),
                    ("[q]", "Exit"),
                ],
            },
        };

        let mut spans = Vec::with_capacity(keys.len() * 2);
        for (index, (key, label)) in keys.iter().enumerate() {
            spans.push(Span::styled(*key, key_style));
            let separator = if index + 1 == keys.len() { "" } else { "   " };
            spans.push(Span::raw(format!(" {label}{separator}")));
        }
        Line::from(spans)
    }

    fn draw_form<F: FormField>(&self, frame: &mut Frame, area: Rect, title: &str, form: &Form<F>) {
        let popup_area = centered_rect(60, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = form.lines();
        lines.push(Line::from(""));
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to submit • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        frame.set_cursor_position((
            inner.x + form.cursor_offset(),
            inner.y + form.active_row() as u16,
        ));
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}

fn header_row<const N: usize>(titles: [&'static str; N]) -> Row<'static> {
    Row::new(titles).style(Style::default().add_modifier(Modifier::BOLD))
}

fn highlight_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

fn render_message(frame: &mut Frame, area: Rect, block: Block<'_>, text: &str) {
    let message = Paragraph::new(text.to_string())
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(message, area);
}

fn loan_table<'a>(loans: &[Entry<'_, UserRecord>], block: Block<'a>) -> Table<'a> {
    let rows: Vec<Row<'a>> = loans
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let loan = entry.record;
            Row::new(vec![
                (index + 1).to_string(),
                loan.name.clone(),
                loan.user_id.clone(),
                loan.book_name.clone(),
                loan.book_id.clone(),
                loan.start().format(LIBRARY_DATE_FORMAT).to_string(),
                loan.expiry().format(LIBRARY_DATE_FORMAT).to_string(),
            ])
        })
        .collect();
    let widths = [
        Constraint::Length(6),
        Constraint::Percentage(18),
        Constraint::Length(10),
        Constraint::Percentage(22),
        Constraint::Length(10),
        Constraint::Length(12),
        Constraint::Length(12),
    ];
    Table::new(rows, widths)
        .header(header_row([
            "S.No", "Name", "User ID", "Book Name", "Book ID", "Start", "Expiry",
        ]))
        .block(block)
        .row_highlight_style(highlight_style())
        .highlight_symbol("▶ ")
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tempfile::TempDir;

    use super::*;
    use crate::auth::StaticCredentials;

    fn app(desk: DeskKind, dir: &TempDir) -> App {
        let config = Config {
            desk,
            report_dir: dir.path().to_path_buf(),
            log_dir: dir.path().to_path_buf(),
            username: "admin".into(),
            password: "pw".into(),
        };
        let mut app = App::new(&config, Box::new(StaticCredentials::new("admin", "pw")));
        app.tick(
            NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
        );
        app
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch));
        }
    }

    fn login(app: &mut App, password: &str) {
        type_text(app, "admin");
        app.handle_key(KeyCode::Tab);
        type_text(app, password);
        app.handle_key(KeyCode::Enter);
    }

    fn status(app: &App) -> String {
        app.status
            .as_ref()
            .map(|status| status.text.clone())
            .unwrap_or_default()
    }

    fn add_product(app: &mut App, name: &str, quantity: &str, price: &str) {
        app.handle_key(KeyCode::Char('+'));
        type_text(app, name);
        app.handle_key(KeyCode::Tab);
        type_text(app, quantity);
        app.handle_key(KeyCode::Tab);
        type_text(app, price);
        app.handle_key(KeyCode::Enter);
    }

    #[test]
    fn wrong_password_stays_on_login() {
        let dir = TempDir::new().unwrap();
        let mut app = app(DeskKind::Billing, &dir);
        login(&mut app, "nope");
        assert!(matches!(app.screen, Screen::Login(_)));
        assert_eq!(status(&app), "Invalid username or password.");
    }

    #[test]
    fn billing_flow_through_keys() {
        let dir = TempDir::new().unwrap();
        let mut app = app(DeskKind::Billing, &dir);
        login(&mut app, "pw");
        assert!(matches!(app.screen, Screen::Billing(_)));

        add_product(&mut app, "Pen", "10", "2.5");
        add_product(&mut app, "Book", "2", "20");
        assert_eq!(status(&app), "Added Book. Total Bill: ₹65.00");

        add_product(&mut app, "pen", "1", "1");
        assert!(matches!(app.mode, Mode::ProductForm { .. }));
        assert_eq!(status(&app), "Product with the same name already exists.");
        app.handle_key(KeyCode::Esc);

        app.handle_key(KeyCode::Char('-'));
        assert_eq!(status(&app), "Please select a product to delete.");

        app.handle_key(KeyCode::Char('s'));
        assert!(dir.path().join("bill.txt").exists());

        let Screen::Billing(billing) = &app.screen else {
            panic!("billing screen expected");
        };
        assert_eq!(billing.desk.products().len(), 2);
    }

    #[test]
    fn search_then_reset() {
        let dir = TempDir::new().unwrap();
        let mut app = app(DeskKind::Billing, &dir);
        login(&mut app, "pw");
        add_product(&mut app, "Pen", "10", "2.5");
        add_product(&mut app, "Notebook", "5", "3");

        app.handle_key(KeyCode::Char('f'));
        type_text(&mut app, "pen");
        app.handle_key(KeyCode::Enter);
        {
            let Screen::Billing(billing) = &app.screen else {
                panic!("billing screen expected");
            };
            assert_eq!(billing.visible().len(), 1);
        }

        app.handle_key(KeyCode::Char('r'));
        let Screen::Billing(billing) = &app.screen else {
            panic!("billing screen expected");
        };
        assert_eq!(billing.visible().len(), 2);
    }

    #[test]
    fn library_duplicate_user_is_reported() {
        let dir = TempDir::new().unwrap();
        let mut app = app(DeskKind::Library, &dir);
        login(&mut app, "pw");

        for _ in 0..2 {
            app.handle_key(KeyCode::Char('+'));
            type_text(&mut app, "Ravi");
            app.handle_key(KeyCode::Tab);
            type_text(&mut app, "U1");
            app.handle_key(KeyCode::Tab);
            type_text(&mut app, "Dune");
            app.handle_key(KeyCode::Tab);
            type_text(&mut app, "B1");
            app.handle_key(KeyCode::Enter);
        }

        assert!(status(&app).starts_with("Duplicate User ID: U1"));
        let alerts = std::fs::read_to_string(dir.path().join("admin_alerts.txt")).unwrap();
        assert_eq!(alerts, "Duplicate User ID: U1 by Ravi on 2024-06-01\n");
    }
}
