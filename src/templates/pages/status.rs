// templates/pages/status.rs

use crate::status_board::CycleSummary;
use crate::templates::{components::card, desktop_layout};
use maud::{html, Markup};

pub fn status_page(summary: Option<&CycleSummary>) -> Markup {
    desktop_layout(
        "Case Tracker Status",
        html! {
            h1 { "Case Tracker" }
            @match summary {
                None => {
                    (card("Last cycle", html! { p { "No poll cycle has finished yet." } }))
                }
                Some(summary) => {
                    (card("Last cycle", html! {
                        p { "Finished at " (summary.finished_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()) }
                        table {
                            thead {
                                tr {
                                    th { "Case" }
                                    th { "Outcome" }
                                    th { "Emailed" }
                                    th { "Saved" }
                                    th { "Notes" }
                                }
                            }
                            tbody {
                                @for case in &summary.cases {
                                    tr {
                                        td { (case.case_id) }
                                        td { (case.outcome) }
                                        td { @if case.emailed { "yes" } @else { "no" } }
                                        td { @if case.saved { "yes" } @else { "no" } }
                                        td { (case.note.as_deref().unwrap_or("")) }
                                    }
                                }
                            }
                        }
                    }))
                }
            }
        },
    )
}
