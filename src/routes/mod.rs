use actix_web::{HttpRequest, HttpResponse};
use actix_web::http::header;
use actix_web_flash_messages::{IncomingFlashMessages, Level};
use tera::{Context, Tera};

pub mod main;
pub mod products;

/// Bootstrap alert class for a flash message level.
pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        Level::Info => "info",
        Level::Debug => "secondary",
    }
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(e) => {
            log::error!("Failed to render template '{template}': {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Local path the user came from, taken from the `Referer` header.
///
/// Absolute URLs are reduced to their path when they point at the host
/// serving the request. Other hosts and protocol-relative values yield
/// `None`.
pub fn local_referer(req: &HttpRequest) -> Option<&str> {
    let referer = req.headers().get(header::REFERER)?.to_str().ok()?;

    let path = match referer
        .strip_prefix("http://")
        .or_else(|| referer.strip_prefix("https://"))
    {
        Some(rest) => {
            let (host, path) = rest.split_at(rest.find('/').unwrap_or(rest.len()));
            if host != req.connection_info().host() {
                return None;
            }
            if path.is_empty() { "/" } else { path }
        }
        None => referer,
    };

    let is_local =
        path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\");
    is_local.then_some(path)
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub fn base_context(flash_messages: &IncomingFlashMessages, current_page: &str) -> Context {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_page", current_page);
    context
}
