//! r404 page: the error page that hosts the interactive 404 module.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use r404_page::{Application, ErrorPageProps};
//!
//! Application::new()
//!     .title("Lost")
//!     .props(ErrorPageProps::not_found())
//!     .run(|host| Ok(MyLoader::new(host)));
//! ```
//!
//! The builder closure runs once the window exists and returns the module
//! loader; the page wires it to a render-loop controller. For anything other
//! than a 404 the closure is never called and the page stays static.

pub mod app;
pub mod page;
pub mod props;
pub mod view;

// Top-level re-exports for the common entry point: `use r404_page::Application`
pub use app::Application;
pub use page::ErrorPage;
pub use props::{DocumentProps, ErrorPageProps, PageContext};
pub use view::{render_document, PageView};
