//! Request routing: one request in, raw bytes or nothing out

mod errors;
mod request;
#[allow(clippy::module_inception)]
mod router;

pub use errors::{RequestError, RequestResult};
pub use request::{Operation, Request};
pub use router::RequestRouter;
