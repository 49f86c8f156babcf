pub mod adapters;
pub mod config;
pub mod domain;
pub mod infra;
pub mod services;

use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<services::payment_pipeline::PaymentPipeline>,
}
