// src/tests/router_tests/health_tests.rs

use super::{body_string, get};
use crate::errors::ServerError;
use crate::responses::error_to_response;
use crate::status_board::StatusBoard;

#[test]
fn health_returns_ok() {
    let board = StatusBoard::default();
    let mut resp = get("/health", &board).unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(body_string(&mut resp), "OK");
}

#[test]
fn root_says_running() {
    let board = StatusBoard::default();
    let mut resp = get("/", &board).unwrap();

    assert_eq!(resp.status(), 200);
    assert!(body_string(&mut resp).contains("running"));
}

#[test]
fn unknown_path_is_not_found() {
    let board = StatusBoard::default();
    let err = get("/admin", &board).unwrap_err();
    assert!(matches!(err, ServerError::NotFound));

    let resp = error_to_response(err);
    assert_eq!(resp.status(), 404);
}
