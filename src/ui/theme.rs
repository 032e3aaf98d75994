use crate::statement::StatementKind;
use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub warn: Style,
    pub dim: Style,
    pub query: Style,
    pub mutation: Style,
}

impl Theme {
    pub fn detect() -> Self {
        if !console::Term::stdout().is_term() {
            return Self::plain();
        }
        Self::colored()
    }

    pub fn colored() -> Self {
        Self {
            header: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            warn: Style::new().yellow().bold(),
            dim: Style::new().white().dimmed(),
            query: Style::new().blue().bold(),
            mutation: Style::new().magenta().bold(),
        }
    }

    pub fn plain() -> Self {
        Self {
            header: Style::new(),
            success: Style::new(),
            warn: Style::new(),
            dim: Style::new(),
            query: Style::new(),
            mutation: Style::new(),
        }
    }

    /// Style for a statement tag: reads and writes are told apart
    pub fn kind(&self, kind: StatementKind) -> Style {
        match kind {
            StatementKind::Root => self.dim.clone(),
            StatementKind::Select => self.query.clone(),
            _ => self.mutation.clone(),
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}
