mod middleware;
mod response;

pub use middleware::{cors_layer, trace_id_middleware, TraceContext, REQUEST_ID_HEADER, TRACE_ID_HEADER};
pub use response::{ApiError, ErrorResponse};
