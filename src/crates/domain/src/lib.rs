pub mod album;
pub mod artist;
pub mod entity;
pub mod store;
pub mod value;
