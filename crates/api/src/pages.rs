pub const INDEX_HTML: &str = include_str!("../assets/index.html");
pub const CHATBOT_HTML: &str = include_str!("../assets/chatbot.html");
pub const SCRIPT_JS: &str = include_str!("../assets/script.js");
const READ_HTML: &str = include_str!("../assets/read.html");

pub fn render_read_page(text: &str) -> String {
    READ_HTML.replace("{{text}}", &html_escape(text))
}

pub fn html_escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}
