pub mod diet;
pub mod sleep_data;
