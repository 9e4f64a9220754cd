use crate::errors::ServerError;
use astra::{Body, Response, ResponseBuilder};

/// Convert a ServerError into a plain-text response
pub fn error_to_response(err: ServerError) -> Response {
    let status = match err {
        ServerError::NotFound => 404,
        ServerError::InternalError => 500,
    };

    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", mime::TEXT_PLAIN_UTF_8.as_ref())
        .body(Body::from(err.to_string()))
        .unwrap_or_else(|_| Response::new(Body::from("Internal Server Error")))
}
