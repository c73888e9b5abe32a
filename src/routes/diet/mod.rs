mod handlers;
mod types;

pub use handlers::{echo, ingest_dietary_energy, list_diet};
pub use types::{DietDayResponse, DietIngestResponse, DietRangeQuery, ExportData, ExportMetric, HealthExport};

// Re-export utoipa path structs for OpenAPI documentation
pub use handlers::{__path_echo, __path_ingest_dietary_energy, __path_list_diet};
