//! Build-time variable substitution.
//!
//! Expands `$NAME` and `${NAME}` references against a list of `KEY=VALUE`
//! entries, where a later entry wins over an earlier one with the same key.
//! A reference to a variable that is not defined is left in place exactly as
//! it was written. Inside braces the `:-`, `:+` and `:?` modifiers are
//! understood, and their word is expanded in turn.

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SubstitutionError {
    #[error("missing '}}' in {0:?}")]
    Unterminated(String),
    #[error("empty variable name in {0:?}")]
    EmptyName(String),
    #[error("invalid variable name in {0:?}")]
    InvalidName(String),
    #[error("unsupported modifier {modifier:?} for variable {name:?}")]
    UnsupportedModifier { name: String, modifier: String },
    #[error("{name}: {message}")]
    Required { name: String, message: String },
}

pub fn expand(raw: &str, envs: &[String]) -> Result<String, SubstitutionError> {
    Expander { envs }.expand(raw)
}

/// Finds the value of `name` in `envs`, the last definition winning.
pub fn lookup_env<'a>(envs: &'a [String], name: &str) -> Option<&'a str> {
    envs.iter().rev().find_map(|entry| {
        let (key, value) = entry.split_once('=')?;
        if key == name {
            Some(value)
        } else {
            None
        }
    })
}

struct Expander<'a> {
    envs: &'a [String],
}

impl<'a> Expander<'a> {
    fn expand(&self, raw: &str) -> Result<String, SubstitutionError> {
        let mut out = String::with_capacity(raw.len());
        let mut chars = raw.char_indices().peekable();

        while let Some((index, c)) = chars.next() {
            match c {
                '\\' => match chars.peek() {
                    Some(&(_, next)) if next == '$' || next == '\\' => {
                        out.push(next);
                        chars.next();
                    }
                    _ => out.push('\\'),
                },
                '$' => match chars.peek() {
                    Some(&(_, '{')) => {
                        let end = closing_brace(raw, index + 2)
                            .ok_or_else(|| SubstitutionError::Unterminated(raw[index..].into()))?;

                        while let Some(&(next, _)) = chars.peek() {
                            if next > end {
                                break;
                            }
                            chars.next();
                        }

                        let expanded = self.braced(&raw[index..=end], &raw[index + 2..end])?;
                        out.push_str(&expanded);
                    }
                    Some(&(_, next)) if is_name_char(next) => {
                        let mut end = index + 1;
                        while let Some(&(next_index, next)) = chars.peek() {
                            if !is_name_char(next) {
                                break;
                            }
                            end = next_index + next.len_utf8();
                            chars.next();
                        }

                        let reference = &raw[index..end];
                        match lookup_env(self.envs, &reference[1..]) {
                            Some(value) => out.push_str(value),
                            None => out.push_str(reference),
                        }
                    }
                    _ => out.push('$'),
                },
                c => out.push(c),
            }
        }

        Ok(out)
    }

    /// Expands the body of a `${...}` reference; `whole` is the reference
    /// including `${` and `}`.
    fn braced(&self, whole: &str, body: &str) -> Result<String, SubstitutionError> {
        let name_len = body.find(|c: char| !is_name_char(c)).unwrap_or(body.len());
        let (name, rest) = body.split_at(name_len);

        if name.is_empty() {
            return Err(SubstitutionError::EmptyName(whole.into()));
        }

        if rest.is_empty() {
            return Ok(lookup_env(self.envs, name).unwrap_or(whole).into());
        }

        let mut modifier = rest.chars();
        let (modifier, word) = match (modifier.next(), modifier.next()) {
            (Some(':'), Some(op)) if op == '-' || op == '+' || op == '?' => (op, &rest[2..]),
            (Some(c), _) if c == ':' || "-+?=#%/".contains(c) => {
                return Err(SubstitutionError::UnsupportedModifier {
                    name: name.into(),
                    modifier: rest.chars().take(2).collect(),
                });
            }
            _ => return Err(SubstitutionError::InvalidName(whole.into())),
        };

        let value = lookup_env(self.envs, name).filter(|value| !value.is_empty());

        match modifier {
            '-' => match value {
                Some(value) => Ok(value.into()),
                None => self.expand(word),
            },
            '+' => match value {
                Some(_) => self.expand(word),
                None => Ok(String::new()),
            },
            _ => match value {
                Some(value) => Ok(value.into()),
                None => {
                    let message = if word.is_empty() {
                        "is not allowed to be empty".to_string()
                    } else {
                        self.expand(word)?
                    };
                    Err(SubstitutionError::Required {
                        name: name.into(),
                        message,
                    })
                }
            },
        }
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Byte index of the `}` closing a reference whose body starts at `from`.
fn closing_brace(raw: &str, from: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut chars = raw[from..].char_indices();

    while let Some((index, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '{' => depth += 1,
            '}' if depth == 0 => return Some(from + index),
            '}' => depth -= 1,
            _ => (),
        }
    }

    None
}
