pub mod connection;
pub mod operations;

pub use connection::StoreError;
pub use operations::store_observation;
