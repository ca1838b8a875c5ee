pub mod api;
pub mod client;
pub mod parse;
pub mod types;

pub use api::ListingSource;
pub use client::LeboncoinClient;
pub use types::Listing;
