pub mod index_entry;
pub mod listing;
pub mod ward;

pub use index_entry::IndexEntry;
pub use listing::{Coordinate, Listing, StationWalk};
pub use ward::{Prefecture, Ward};
