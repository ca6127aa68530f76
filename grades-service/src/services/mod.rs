pub mod database;
pub mod metrics;

pub use database::MongoDb;
pub use metrics::{get_metrics, init_metrics};
