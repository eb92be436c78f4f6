//! Data module - CSV loading, cleaning and reshaping

mod loader;
mod processor;
pub mod schema;
mod season;

pub use loader::{LoaderError, MortalityLoader};
pub use processor::{DataProcessor, ProcessorError, DEFAULT_SAMPLE_SIZE};
pub use schema::MortalityRecord;
pub use season::Season;
