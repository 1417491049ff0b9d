pub mod profile;
pub mod responses;
