pub mod estimate;
pub mod request;
