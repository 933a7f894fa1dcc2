mod drift;

use r404_engine::core::HostCtx;
use r404_engine::logging::LoggingConfig;
use r404_page::{Application, ErrorPageProps, PageContext};

fn main() {
    let mut status = 404;
    let mut url = String::from("/does-not-exist");

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--server-error" => status = 500,
            other if other.starts_with('/') => url = other.to_string(),
            other => {
                eprintln!("usage: r404-demo [--server-error] [/path]");
                eprintln!("unknown argument: {other}");
                std::process::exit(2);
            }
        }
    }

    let props = ErrorPageProps::from_status(status);
    let context = PageContext::new(url, props).with_document(
        format!("{} | r404", props.status_code()),
        "Native host for the interactive error page",
    );

    Application::new()
        .title(format!("r404: {}", props.status_code()))
        .context(context)
        .logging(LoggingConfig::default())
        .run(|host: &HostCtx| drift::loader(host))
}
