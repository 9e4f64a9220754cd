mod health_tests;
mod status_tests;

use crate::errors::ServerError;
use crate::router::handle;
use crate::status_board::StatusBoard;
use astra::{Body, Request, Response};
use http::Method;
use std::io::Read;

fn get(path: &str, board: &StatusBoard) -> Result<Response, ServerError> {
    let req: Request = http::Request::builder()
        .method(Method::GET)
        .uri(path)
        .body(Body::from(String::new()))
        .unwrap();
    handle(req, board)
}

fn body_string(resp: &mut Response) -> String {
    let mut bytes = Vec::new();
    resp.body_mut().reader().read_to_end(&mut bytes).unwrap();
    String::from_utf8(bytes).unwrap()
}
