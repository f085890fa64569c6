//! Request/response DTOs for the Web API.

pub mod request;
pub mod response;

pub use request::AddEntryRequest;
pub use response::{ApiResponse, EntriesResponse};
