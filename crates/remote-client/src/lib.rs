pub mod client;
pub mod errors;
pub mod retry;

pub use client::{
    EntityClient, HttpEntityClient, ProductClient, RemoteEntity, UserClient,
};
pub use errors::FetchError;
pub use retry::RetryPolicy;
