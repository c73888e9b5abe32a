mod handlers;
mod types;

pub use handlers::{create_sleep, get_sleep, get_sleep_by_day, list_sleep};
pub use types::{SleepRangeQuery, SleepRangeResponse, SleepRecordResponse};

// Re-export utoipa path structs for OpenAPI documentation
pub use handlers::{__path_create_sleep, __path_get_sleep, __path_get_sleep_by_day, __path_list_sleep};
