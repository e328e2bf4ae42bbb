pub mod irr;
pub mod summary;
