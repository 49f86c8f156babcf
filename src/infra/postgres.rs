pub mod audit_repo;
pub mod email_queue;
pub mod payment_repo;
