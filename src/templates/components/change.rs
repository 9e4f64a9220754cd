use crate::domain::Change;
use crate::templates::components::value_text;
use maud::{html, Markup};

const ADDED: &str = "color: green;";
const REMOVED: &str = "color: red;";

pub fn change_item(change: &Change) -> Markup {
    html! {
        li {
            strong { (change.field) } ": "
            @match (&change.old_value, &change.new_value) {
                (None, Some(new)) => {
                    span style=(ADDED) { (value_text(new)) } " (new field)"
                }
                (Some(old), None) => {
                    span style=(REMOVED) { (value_text(old)) } " (removed)"
                }
                (Some(old), Some(new)) => {
                    span style=(REMOVED) { (value_text(old)) }
                    " → "
                    span style=(ADDED) { (value_text(new)) }
                }
                (None, None) => {}
            }
        }
    }
}
