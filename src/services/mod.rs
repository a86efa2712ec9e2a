pub mod review_api;

pub use review_api::ReviewApi;
