//! Quote-aware command tokenization.
//!
//! Splits a direct-command string into a program and its arguments without
//! involving a shell, so arguments containing spaces survive. Grammar:
//! single-quoted segments are literal, double-quoted segments honor `\"`
//! and `\\`, and a backslash outside quotes escapes the next character.
//! Unbalanced quoting fails the spawn rather than silently misparsing.

use crate::error::SessionError;

/// Split a command line into tokens.
///
/// The first token is the program to execute; the rest are its arguments.
///
/// # Errors
///
/// [`SessionError::EmptyCommand`] when no tokens remain,
/// [`SessionError::UnbalancedQuote`] on an unterminated quote or a trailing
/// bare backslash.
pub fn split_command(input: &str) -> Result<Vec<String>, SessionError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    // Whether `current` holds a token, so `""` yields an empty argument.
    let mut has_token = false;
    let mut chars = input.chars();

    while let Some(ch) = chars.next() {
        match ch {
            c if c.is_whitespace() => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            '\'' => {
                has_token = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => current.push(c),
                        None => return Err(SessionError::UnbalancedQuote(input.to_string())),
                    }
                }
            }
            '"' => {
                has_token = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(c @ ('"' | '\\')) => current.push(c),
                            Some(c) => {
                                current.push('\\');
                                current.push(c);
                            }
                            None => {
                                return Err(SessionError::UnbalancedQuote(input.to_string()))
                            }
                        },
                        Some(c) => current.push(c),
                        None => return Err(SessionError::UnbalancedQuote(input.to_string())),
                    }
                }
            }
            '\\' => match chars.next() {
                Some(c) => {
                    has_token = true;
                    current.push(c);
                }
                None => return Err(SessionError::UnbalancedQuote(input.to_string())),
            },
            c => {
                has_token = true;
                current.push(c);
            }
        }
    }

    if has_token {
        tokens.push(current);
    }

    if tokens.is_empty() {
        return Err(SessionError::EmptyCommand);
    }

    Ok(tokens)
}

// =============================================================================
// TESTS
// =============================================================================
