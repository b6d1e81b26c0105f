use actix_web::web::PayloadConfig;

use crate::config::Http;

mod cron;
mod health;
mod worker;

#[cfg(test)]
mod tests;

macros_utils::routes! {
    route health::health_route,
    route worker::list_targets,
    route worker::push_results,
    route cron::run_cycle,
}

/// Body limit shared by every route; the push endpoint reads raw bytes
pub fn payload_config(http: &Http) -> PayloadConfig {
    PayloadConfig::new(http.max_payload_bytes)
}
