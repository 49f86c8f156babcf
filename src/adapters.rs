pub mod api_errors;
pub mod http;
pub mod images;
pub mod sandbox;
pub mod stripe_client;
