pub mod storage;
pub mod types;

pub use storage::{load_entities, parse_entities, EntityFormat};
pub use types::{Entity, EntityFile, EntityRecord};
