use maud::{html, Markup, DOCTYPE};

/// Wraps an email body. Mail clients drop stylesheets, so styles are inline.
pub fn email_layout(title: &str, footer: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (title) }
            }
            body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;" {
                div style="max-width: 640px; margin: 0 auto; padding: 20px;" {
                    (content)
                    hr style="margin-top: 30px; border: none; border-top: 1px solid #eee;";
                    p style="font-size: 0.8em; color: #999;" { (footer) }
                }
            }
        }
    }
}
