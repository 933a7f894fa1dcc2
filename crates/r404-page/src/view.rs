use std::fmt::Write as _;

use r404_engine::surface::SurfaceSpec;

use crate::props::{ErrorPageProps, PageContext};

const NOT_FOUND_HEADING: &str = "404 Page Not Found";
const NOT_FOUND_MESSAGE: &str =
    "This page could not be found. You can however enjoy yourself playing a little";
const SERVER_ERROR_HEADING: &str = "500 Internal Server Error";
const SERVER_ERROR_MESSAGE: &str = "Something went wrong.";

const DEFAULT_TITLE: &str = "Page not available";
const DEFAULT_DESCRIPTION: &str = "The requested page could not be shown";

/// Static content of the error page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub heading: String,
    pub message: String,
    /// Interactive surface; present on the 404 page only.
    pub surface: Option<SurfaceSpec>,
}

impl PageView {
    pub fn for_props(props: &ErrorPageProps, surface: &SurfaceSpec) -> Self {
        if props.is_404 {
            Self {
                heading: NOT_FOUND_HEADING.to_string(),
                message: NOT_FOUND_MESSAGE.to_string(),
                surface: Some(surface.clone()),
            }
        } else {
            Self {
                heading: SERVER_ERROR_HEADING.to_string(),
                message: SERVER_ERROR_MESSAGE.to_string(),
                surface: None,
            }
        }
    }

    /// Body markup of the page.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        match &self.surface {
            Some(spec) => {
                let _ = write!(
                    out,
                    "<div class=\"error-page\"><h2>{}</h2><p>{}</p>\
                     <div class=\"surface-frame\">\
                     <canvas id=\"{}\" width=\"{}\" height=\"{}\"></canvas>\
                     </div></div>",
                    escape_html(&self.heading),
                    escape_html(&self.message),
                    escape_html(&spec.element_id),
                    spec.width,
                    spec.height,
                );
            }
            None => {
                let _ = write!(
                    out,
                    "<h1>{}</h1>{}",
                    escape_html(&self.heading),
                    escape_html(&self.message),
                );
            }
        }
        out
    }
}

/// Wraps `view` in a complete HTML document.
pub fn render_document(ctx: &PageContext, view: &PageView) -> String {
    let (title, description) = match &ctx.document {
        Some(doc) => (doc.title.as_str(), doc.description.as_str()),
        None => (DEFAULT_TITLE, DEFAULT_DESCRIPTION),
    };

    let mut out = String::from("<!DOCTYPE html>\n");
    let _ = write!(
        out,
        "<html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"UTF-8\" />\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\" />\n\
         <meta name=\"description\" content=\"{}\" />\n\
         <title>{}</title>\n\
         </head>\n\
         <body>\n\
         <div id=\"page-view\">{}</div>\n\
         </body>\n\
         </html>\n",
        escape_html(description),
        escape_html(title),
        view.to_html(),
    );
    out
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
