use crate::errors::{ResultResp, ServerError};
use crate::responses::{html_response, text_response};
use crate::status_board::StatusBoard;
use crate::templates;
use astra::Request;

pub fn handle(req: Request, board: &StatusBoard) -> ResultResp {
    let method = req.method().as_str();
    let path = req.uri().path();

    match (method, path) {
        ("GET", "/") => text_response(200, "Case tracker is running"),
        ("GET", "/health") => text_response(200, "OK"),
        ("GET", "/status") => {
            let latest = board.latest();
            html_response(templates::pages::status_page(latest.as_ref()))
        }
        _ => Err(ServerError::NotFound),
    }
}
