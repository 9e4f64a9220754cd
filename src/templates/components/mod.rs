use crate::domain::{Change, StatusDocument};
use maud::{html, Markup};
use serde_json::Value;

pub mod change;

pub use change::change_item;

pub fn card(title: &str, body: Markup) -> Markup {
    html! {
        div class="card" {
            h2 { (title) }
            div class="card-body" {
                (body)
            }
        }
    }
}

/// Plain text for a field value: strings without quotes, everything else as compact JSON.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Full document as pretty JSON in a preformatted block.
pub fn status_block(doc: &StatusDocument) -> Markup {
    html! {
        pre style="background-color: #f5f5f5; padding: 15px; border-radius: 5px; overflow-x: auto; font-family: monospace;" {
            (doc.to_pretty_json())
        }
    }
}

pub fn change_list(changes: &[Change]) -> Markup {
    html! {
        ul {
            @for change in changes {
                (change_item(change))
            }
        }
    }
}
