/// Props the router hands to the error page.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ErrorPageProps {
    /// The requested route does not exist. Anything else is a server error.
    pub is_404: bool,
}

impl ErrorPageProps {
    pub const fn not_found() -> Self {
        Self { is_404: true }
    }

    pub const fn server_error() -> Self {
        Self { is_404: false }
    }

    /// Props for an HTTP status; only 404 gets the interactive page.
    pub const fn from_status(status: u16) -> Self {
        Self { is_404: status == 404 }
    }

    pub const fn status_code(&self) -> u16 {
        if self.is_404 { 404 } else { 500 }
    }
}

/// Head metadata of the rendered document.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DocumentProps {
    pub title: String,
    pub description: String,
}

/// What the router knows about the request being rendered.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PageContext {
    pub url: String,
    pub props: ErrorPageProps,
    /// Missing metadata falls back to defaults in `render_document`.
    pub document: Option<DocumentProps>,
}

impl PageContext {
    pub fn new(url: impl Into<String>, props: ErrorPageProps) -> Self {
        Self {
            url: url.into(),
            props,
            document: None,
        }
    }

    pub fn with_document(mut self, title: impl Into<String>, description: impl Into<String>) -> Self {
        self.document = Some(DocumentProps {
            title: title.into(),
            description: description.into(),
        });
        self
    }
}
