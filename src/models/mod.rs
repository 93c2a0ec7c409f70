pub mod alert_record;
pub mod price_sample;
pub mod product;
pub mod user;

pub use alert_record::AlertRecord;
pub use price_sample::PriceSample;
pub use product::{Currency, TrackedProduct};
pub use user::User;
