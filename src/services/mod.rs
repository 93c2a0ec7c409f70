pub mod extractor;
pub mod rate_gate;
pub mod store;
pub mod db_init;

pub mod deals;
pub mod mailer;
pub mod notifier;
pub mod checker;
