//! Login page state: a single session token field.

#[derive(Debug, Clone, Default)]
pub struct LoginState {
    pub token_input: String,
    /// Reason shown above the form, e.g. after an expired session.
    pub notice: Option<String>,
}

impl LoginState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notice(notice: impl Into<String>) -> Self {
        Self {
            token_input: String::new(),
            notice: Some(notice.into()),
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.token_input.push(c);
    }

    pub fn pop_char(&mut self) {
        self.token_input.pop();
    }

    /// Takes the trimmed token, leaving the field empty. `None` if blank.
    pub fn submit(&mut self) -> Option<String> {
        let token = std::mem::take(&mut self.token_input).trim().to_string();
        if token.is_empty() {
            None
        } else {
            self.notice = None;
            Some(token)
        }
    }

    /// The token rendered as bullets.
    pub fn masked(&self) -> String {
        "•".repeat(self.token_input.chars().count())
    }
}
