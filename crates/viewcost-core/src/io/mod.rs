pub mod layout;
pub mod npy;
pub mod sequence;
pub mod store;

pub use layout::{CacheLayout, CostMatrixKey, TableRowKey};
pub use store::{ArtifactKey, ArtifactStore, Outcome};
