//! Data model: stored documents, the normalized [`OrderSnapshot`], and the
//! [`Coordinate`] value type.

pub mod coordinate;
pub mod ids;
pub mod raw;
pub mod snapshot;

pub use coordinate::*;
pub use ids::*;
pub use raw::*;
pub use snapshot::*;
