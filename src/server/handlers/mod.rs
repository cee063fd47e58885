//! HTTP handlers grouped by scope.

pub(crate) mod ext;
pub(crate) mod plugins;
pub(crate) mod update;

use actix_web::web;

/// Register all routes on an actix application.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(update::scope())
        .service(plugins::scope())
        .service(ext::scope());
}
