use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::error::StoreError;

/// Which record kind a footer message talks about.
#[derive(Copy, Clone)]
pub(crate) enum Subject {
    Product,
    Loan,
    Book,
}

/// The action that produced an error, for picking the right wording.
#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    Add,
    Update,
    Delete,
    Save,
}

impl Subject {
    fn noun(self) -> &'static str {
        match self {
            Subject::Product => "product",
            Subject::Loan => "user",
            Subject::Book => "book",
        }
    }

    fn key_name(self) -> &'static str {
        match self {
            Subject::Product => "name",
            Subject::Loan | Subject::Book => "ID",
        }
    }
}

/// Turn a desk error into the one-line message shown in the footer.
pub(crate) fn describe_error(subject: Subject, action: Action, err: &StoreError) -> String {
    match err {
        StoreError::InvalidInput(message) => message.clone(),
        StoreError::DuplicateKey { key } => match (subject, action) {
            (Subject::Loan, _) => format!("Duplicate User ID: {key}. This has been reported to the admin."),
            (_, Action::Update) => format!(
                "Another {} with the same {} already exists.",
                subject.noun(),
                subject.key_name()
            ),
            _ => format!(
                "{} with the same {} already exists.",
                capitalize(subject.noun()),
                subject.key_name()
            ),
        },
        StoreError::NotFound => {
            let verb = match action {
                Action::Update => "update",
                _ => "delete",
            };
            format!("Please select a {} to {verb}.", subject.noun())
        }
        StoreError::Io { path, source } => {
            format!("Error saving the file {}: {source}", path.display())
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}
