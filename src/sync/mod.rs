pub mod scheduler;
pub mod transform;
pub mod worker;
