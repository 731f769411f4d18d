pub mod aggregate;
pub mod period;
pub mod record;
