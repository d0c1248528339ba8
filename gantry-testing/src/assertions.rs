// HTTP response assertions for functional tests

use gantry_core::HttpResponse;
use regex::Regex;
use std::sync::OnceLock;

// Error extracts longer than this move to their own paragraph below the
// one-line failure message.
const INLINE_ERROR_LIMIT: usize = 100;

/// Assert the response status is 200.
pub fn assert_response_ok(response: &HttpResponse) {
    check(response, Check::Ok, None);
}

pub fn assert_response_ok_with(response: &HttpResponse, message: &str) {
    check(response, Check::Ok, Some(message));
}

/// Assert the response status is in the 3xx range.
pub fn assert_response_redirect(response: &HttpResponse) {
    check(response, Check::Redirect, None);
}

pub fn assert_response_redirect_with(response: &HttpResponse, message: &str) {
    check(response, Check::Redirect, Some(message));
}

/// Assert the response status is 404.
pub fn assert_response_not_found(response: &HttpResponse) {
    check(response, Check::NotFound, None);
}

pub fn assert_response_not_found_with(response: &HttpResponse, message: &str) {
    check(response, Check::NotFound, Some(message));
}

/// Assert the response status is 403.
pub fn assert_response_forbidden(response: &HttpResponse) {
    check(response, Check::Forbidden, None);
}

pub fn assert_response_forbidden_with(response: &HttpResponse, message: &str) {
    check(response, Check::Forbidden, Some(message));
}

/// Assert the response carries an exact status code.
pub fn assert_response_code(response: &HttpResponse, expected: u16) {
    check(response, Check::Code(expected), None);
}

pub fn assert_response_code_with(response: &HttpResponse, expected: u16, message: &str) {
    check(response, Check::Code(expected), Some(message));
}

enum Check {
    Ok,
    Redirect,
    NotFound,
    Forbidden,
    Code(u16),
}

impl Check {
    fn passes(&self, response: &HttpResponse) -> bool {
        match self {
            Check::Ok => response.is_ok(),
            Check::Redirect => response.is_redirect(),
            Check::NotFound => response.is_not_found(),
            Check::Forbidden => response.is_forbidden(),
            Check::Code(expected) => response.status == *expected,
        }
    }

    fn describe(&self, response: &HttpResponse) -> String {
        match self {
            Check::Code(expected) => format!(
                "Failed asserting response status code {} equals {}.",
                response.status, expected
            ),
            _ => format!(
                "Failed asserting that response[{}] {}.",
                response.status,
                self.name()
            ),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Check::Ok => "is ok",
            Check::Redirect => "is redirect",
            Check::NotFound => "is not found",
            Check::Forbidden => "is forbidden",
            Check::Code(_) => "has code",
        }
    }
}

fn check(response: &HttpResponse, check: Check, message: Option<&str>) {
    if check.passes(response) {
        return;
    }

    let err = guess_error_message(response);

    let mut text = match message {
        Some(message) => format!("{}. ", message.trim_end_matches('.')),
        None => String::new(),
    };
    text.push_str(&check.describe(response));
    text.push(' ');

    if err.chars().count() < INLINE_ERROR_LIMIT {
        text.push_str(&one_line(&err));
    } else {
        let truncated: String = err.chars().take(INLINE_ERROR_LIMIT).collect();
        text.push_str(&one_line(&format!("{}...", truncated)));
        text.push_str("\n\n");
        text.push_str(&err);
    }

    panic!("{}", text);
}

/// Derive a human-readable failure hint from a response body.
///
/// HTML bodies contribute their `<title>` text. JSON bodies are
/// pretty-printed and marked FORMATTED. Anything else falls back to
/// `[status] - body`.
pub fn guess_error_message(response: &HttpResponse) -> String {
    let body = response.body_string();

    if let Some(title) = html_title(&body) {
        return title.trim().to_string();
    }

    let mut content = body;
    let mut formatted = "";
    if response
        .content_type()
        .is_some_and(|ct| ct.starts_with("application/json"))
    {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&content) {
            if let Ok(pretty) = serde_json::to_string_pretty(&value) {
                content = pretty;
                formatted = " FORMATTED";
            }
        }
    }

    format!("[{}]{} - {}", response.status, formatted, content)
        .trim()
        .to_string()
}

fn html_title(body: &str) -> Option<String> {
    static TITLE: OnceLock<Option<Regex>> = OnceLock::new();
    let re = TITLE
        .get_or_init(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").ok())
        .as_ref()?;
    re.captures(body).map(|captures| captures[1].to_string())
}

fn one_line(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_break = false;
    for ch in text.chars() {
        if ch == '\n' || ch == '\r' {
            if !in_break {
                out.push(' ');
                in_break = true;
            }
        } else {
            out.push(ch);
            in_break = false;
        }
    }
    out
}
