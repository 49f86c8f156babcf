pub mod payment_pipeline;
