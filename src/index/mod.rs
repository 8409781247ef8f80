/// Index-access layer: the two retrieval legs the hybrid scorer combines
///
/// Both indexes are built once at startup from the chunk store and are
/// immutable afterwards — concurrent queries share them without locking.

pub mod dense;
pub mod sparse;

pub use dense::DenseIndex;
pub use sparse::{tokenize, Bm25Index};
