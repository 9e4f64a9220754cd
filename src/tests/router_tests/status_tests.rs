// src/tests/router_tests/status_tests.rs

use super::{body_string, get};
use crate::orchestrator::{CaseReport, Delivery, Persistence, PollOutcome};
use crate::status_board::StatusBoard;
use crate::tests::utils::doc;
use serde_json::json;

#[test]
fn status_page_before_first_cycle() {
    let board = StatusBoard::default();
    let mut resp = get("/status", &board).unwrap();

    assert_eq!(resp.status(), 200);
    assert!(body_string(&mut resp).contains("No poll cycle has finished yet"));
}

#[test]
fn status_page_lists_last_cycle() {
    let board = StatusBoard::default();
    board.record(&[
        CaseReport {
            case_id: "IOE1".into(),
            outcome: PollOutcome::FirstObservation(doc(json!({"status": "Received"}))),
            delivery: Delivery::Sent,
            persistence: Persistence::Saved,
            baseline_unreadable: false,
        },
        CaseReport {
            case_id: "IOE2".into(),
            outcome: PollOutcome::Changed(doc(json!({"status": "Approved"})), vec![]),
            delivery: Delivery::Failed("API error 503: unavailable".into()),
            persistence: Persistence::Saved,
            baseline_unreadable: false,
        },
    ]);

    let mut resp = get("/status", &board).unwrap();
    let body = body_string(&mut resp);

    assert!(body.contains("IOE1"));
    assert!(body.contains("first observation"));
    assert!(body.contains("IOE2"));
    assert!(body.contains("email failed: API error 503"));
}
