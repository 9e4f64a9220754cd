use maud::{html, Markup, DOCTYPE};

pub fn desktop_layout(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style {
                    "body { font-family: system-ui, sans-serif; max-width: 860px; margin: 3rem auto; padding: 1rem; }"
                    "table { border-collapse: collapse; width: 100%; }"
                    "th, td { text-align: left; padding: 0.4rem 0.6rem; border-bottom: 1px solid #eee; }"
                    ".card { border: 1px solid #ddd; border-radius: 6px; padding: 1rem; margin-bottom: 1rem; }"
                }
            }
            body {
                header {
                    h3 { "Case Tracker" }
                    nav {
                        a href="/status" { "Status" }
                        " · "
                        a href="/health" { "Health" }
                    }
                }
                (content)
            }
        }
    }
}
