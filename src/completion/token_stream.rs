//! Token stream with cursor awareness for completion
//!
//! Splits a raw command line into shell words (quotes and backslash escapes
//! are honoured) and tracks which word the cursor is completing. Only the
//! text before the cursor takes part in resolution.

use std::ops::Range;

/// A shell word with its unquoted text and byte span in the raw line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub span: Range<usize>,
}

impl Token {
    pub fn new(text: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }
}

/// Token stream with cursor position tracking.
///
/// The last token is always the active one, possibly empty when the cursor
/// follows whitespace.
#[derive(Debug, Clone)]
pub struct TokenStream {
    /// Tokens up to and including the active one
    pub tokens: Vec<Token>,
    /// Cursor position (byte index in the original input)
    pub cursor: usize,
    /// Index of the token being completed
    pub token_index: usize,
}

#[derive(Clone, Copy, PartialEq)]
enum Quote {
    None,
    Single,
    Double,
}

impl TokenStream {
    /// Tokenize a raw line, completing at byte offset `cursor`
    pub fn tokenize(line: &str, cursor: usize) -> Self {
        let cursor = clamp_to_boundary(line, cursor);
        let input = &line[..cursor];

        let mut tokens = Vec::new();
        let mut current: Option<(String, usize)> = None;
        let mut quote = Quote::None;
        let mut escaped = false;

        for (idx, ch) in input.char_indices() {
            if escaped {
                // Inside double quotes only these characters are escapable
                if quote == Quote::Double && !matches!(ch, '"' | '\\' | '$' | '`') {
                    push_char(&mut current, '\\', idx);
                }
                push_char(&mut current, ch, idx);
                escaped = false;
                continue;
            }

            match (quote, ch) {
                (Quote::Single, '\'') => quote = Quote::None,
                (Quote::Single, _) => push_char(&mut current, ch, idx),
                (Quote::Double, '"') => quote = Quote::None,
                (Quote::Double, '\\') => escaped = true,
                (Quote::Double, _) => push_char(&mut current, ch, idx),
                (Quote::None, '\\') => {
                    current.get_or_insert_with(|| (String::new(), idx));
                    escaped = true;
                }
                (Quote::None, '\'') => {
                    current.get_or_insert_with(|| (String::new(), idx));
                    quote = Quote::Single;
                }
                (Quote::None, '"') => {
                    current.get_or_insert_with(|| (String::new(), idx));
                    quote = Quote::Double;
                }
                (Quote::None, c) if c.is_whitespace() => {
                    if let Some((text, start)) = current.take() {
                        tokens.push(Token::new(text, start..idx));
                    }
                }
                (Quote::None, _) => push_char(&mut current, ch, idx),
            }
        }

        // An unterminated word (or quote) is the partial token; otherwise the
        // cursor starts a fresh, empty one.
        match current {
            Some((text, start)) => tokens.push(Token::new(text, start..cursor)),
            None => tokens.push(Token::new("", cursor..cursor)),
        }

        let token_index = tokens.len() - 1;
        Self {
            tokens,
            cursor,
            token_index,
        }
    }

    /// Build a stream from pre-split words, completing the word at `active`.
    ///
    /// Words after `active` are ignored; `active == words.len()` completes a
    /// new empty word.
    pub fn from_words<I, S>(words: I, active: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens = Vec::new();
        let mut offset = 0;
        for word in words.into_iter().take(active.saturating_add(1)) {
            let text: String = word.into();
            let end = offset + text.len();
            tokens.push(Token::new(text, offset..end));
            offset = end + 1;
        }
        if tokens.len() <= active {
            tokens.push(Token::new("", offset..offset));
        }

        let token_index = tokens.len() - 1;
        let cursor = tokens[token_index].span.end;
        Self {
            tokens,
            cursor,
            token_index,
        }
    }

    /// Get all tokens before the active one
    pub fn tokens_before_cursor(&self) -> &[Token] {
        &self.tokens[..self.token_index]
    }

    /// Get the token being completed
    pub fn current_token(&self) -> Option<&Token> {
        self.tokens.get(self.token_index)
    }

    /// Get the partial text typed so far for the active token
    pub fn current_prefix(&self) -> &str {
        self.current_token().map(|t| t.text.as_str()).unwrap_or_default()
    }

    /// Get the completion start position (where the replacement begins)
    pub fn completion_start(&self) -> usize {
        self.current_token()
            .map(|t| t.span.start)
            .unwrap_or(self.cursor)
    }

    /// Whether the command word itself is being completed
    pub fn is_command_position(&self) -> bool {
        self.token_index == 0
    }
}

fn push_char(current: &mut Option<(String, usize)>, ch: char, idx: usize) {
    current
        .get_or_insert_with(|| (String::new(), idx))
        .0
        .push(ch);
}

fn clamp_to_boundary(line: &str, cursor: usize) -> usize {
    let mut cursor = cursor.min(line.len());
    while !line.is_char_boundary(cursor) {
        cursor -= 1;
    }
    cursor
}
