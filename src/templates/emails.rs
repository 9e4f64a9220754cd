// src/templates/emails.rs

use crate::domain::{Change, StatusDocument};
use crate::templates::components::{change_list, status_block};
use crate::templates::layouts::email::email_layout;
use maud::{html, Markup};

const FOOTER: &str = "This email was sent by Case Tracker";

pub fn initial_status_email(case_id: &str, current: &StatusDocument) -> Markup {
    email_layout(
        "Initial Status",
        FOOTER,
        html! {
            h2 { "Case Tracker - Initial Status" }
            p { strong { "Case ID: " } (case_id) }
            p {
                "This is the first status check for your case. "
                "Future emails will only be sent when changes are detected."
            }
            h3 { "Current Status:" }
            (status_block(current))
        },
    )
}

pub fn change_notification_email(
    case_id: &str,
    changes: &[Change],
    current: &StatusDocument,
) -> Markup {
    email_layout(
        "Case Status Update",
        FOOTER,
        html! {
            h2 { "Case Status Update Detected!" }
            p { strong { "Case ID: " } (case_id) }
            p { "The following changes were detected in your case status:" }
            (change_list(changes))
            h3 { "Full Current Status:" }
            (status_block(current))
        },
    )
}

pub fn auth_failure_email(context: &str, cause: &str) -> Markup {
    email_layout(
        "Authentication Failed",
        "This alert was sent by Case Tracker",
        html! {
            h2 { "⚠️ Authentication Failed" }
            p { strong { "Context: " } (context) }
            p { strong { "Error: " } (cause) }

            h3 { "What this means:" }
            ul {
                li { strong { "Cookie mode:" } " the session cookie has expired or was revoked." }
                li { strong { "Login command mode:" } " the login helper could not produce a new session. Credentials may be wrong or the account may be locked." }
            }

            h3 { "What to do:" }
            ol {
                li { "Sign in to the case status site in a browser and confirm the account is not locked." }
                li { "Update SESSION_COOKIE, or fix the credentials used by LOGIN_COMMAND." }
                li { "Restart the tracker to pick up the new settings." }
            }

            p {
                strong { "Note: " }
                "If every tracked case fails to authenticate in the same cycle, the tracker stops "
                "instead of retrying, so repeated logins cannot lock the account."
            }
        },
    )
}
