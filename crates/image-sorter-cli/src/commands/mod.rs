pub mod manifest;
pub mod review;
pub mod summary;
