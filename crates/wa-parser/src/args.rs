use wa_core::{AutomationError, CommandKind};

const QUOTED_SEPARATOR: &str = "\" \"";

/// Removes optional quoting around a single-string argument. Inside double
/// quotes only `\"` and `\\` are escapes; any other backslash stays literal,
/// so `"C:\temp\new.png"` keeps its backslashes.
pub fn unquote(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        return unescape(&trimmed[1..trimmed.len() - 1]);
    }
    if trimmed.len() >= 2 && trimmed.starts_with('\'') && trimmed.ends_with('\'') {
        return trimmed[1..trimmed.len() - 1].to_string();
    }
    trimmed.to_string()
}

fn unescape(inner: &str) -> String {
    let mut decoded = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(current) = chars.next() {
        if current == '\\' {
            if let Some(&next) = chars.peek() {
                if next == '"' || next == '\\' {
                    decoded.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        decoded.push(current);
    }
    decoded
}

fn split_quoted(raw: &str, keyword: &str, expected: usize) -> Result<Vec<String>, AutomationError> {
    let trimmed = raw.trim();
    let parts = trimmed.split(QUOTED_SEPARATOR).collect::<Vec<_>>();
    if parts.len() != expected {
        return Err(AutomationError::new(
            "GRAMMAR_ARGUMENT_SHAPE",
            format!(
                "{} expects {} double-quoted strings separated by {}, got: {}",
                keyword, expected, QUOTED_SEPARATOR, trimmed
            ),
        ));
    }

    let last = parts.len() - 1;
    Ok(parts
        .iter()
        .enumerate()
        .map(|(index, part)| {
            let mut value = *part;
            if index == 0 {
                value = value.strip_prefix('"').unwrap_or(value);
            }
            if index == last {
                value = value.strip_suffix('"').unwrap_or(value);
            }
            value.to_string()
        })
        .collect())
}

/// `"first" "second"`. A literal `" "` inside either value cannot be told
/// apart from the separator and yields a shape error.
pub fn parse_pair(raw: &str, keyword: &str) -> Result<(String, String), AutomationError> {
    let mut parts = split_quoted(raw, keyword, 2)?;
    let second = parts.pop().unwrap_or_default();
    let first = parts.pop().unwrap_or_default();
    Ok((first, second))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindAndSaveArgs {
    pub url: String,
    pub query: String,
    pub variable: String,
}

pub fn parse_find_and_save(raw: &str) -> Result<FindAndSaveArgs, AutomationError> {
    let mut parts = split_quoted(raw, CommandKind::FindAndSave.keyword(), 3)?.into_iter();
    let url = parts.next().unwrap_or_default();
    let query = parts.next().unwrap_or_default();
    let variable = parts.next().unwrap_or_default();
    Ok(FindAndSaveArgs {
        url,
        query,
        variable,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveValue {
    Literal(String),
    Nested { kind: CommandKind, args: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveTarget {
    pub variable: String,
    pub value: SaveValue,
}

pub fn parse_save_to_variable(raw: &str) -> Result<SaveTarget, AutomationError> {
    let trimmed = raw.trim_start();
    let Some((variable, rest)) = trimmed.split_once(' ') else {
        return Err(AutomationError::new(
            "GRAMMAR_ARGUMENT_SHAPE",
            format!(
                "SAVE_TO_VARIABLE expects a variable name followed by a value, got: {}",
                trimmed
            ),
        ));
    };
    let rest = rest.trim();

    let nested = CommandKind::ALL
        .into_iter()
        .filter(|kind| kind.is_value_producer())
        .find_map(|kind| {
            let tail = rest.strip_prefix(kind.keyword())?;
            if tail.is_empty() || tail.starts_with(' ') {
                Some(SaveValue::Nested {
                    kind,
                    args: tail.trim_start().to_string(),
                })
            } else {
                None
            }
        });

    Ok(SaveTarget {
        variable: variable.to_string(),
        value: nested.unwrap_or_else(|| SaveValue::Literal(unquote(rest))),
    })
}

/// Formats builder-supplied parameter values into a script line that parses
/// back into the same values.
pub fn build_command_line(kind: CommandKind, values: &[String]) -> Result<String, AutomationError> {
    let expected = kind.params().len();
    if values.len() != expected {
        return Err(AutomationError::new(
            "GRAMMAR_PARAM_COUNT",
            format!(
                "{} takes {} parameter(s), got {}.",
                kind.keyword(),
                expected,
                values.len()
            ),
        ));
    }

    let line = match kind {
        CommandKind::ReadPage => kind.keyword().to_string(),
        CommandKind::SaveToVariable => {
            let variable = values[0].trim();
            if variable.is_empty() || variable.contains(char::is_whitespace) {
                return Err(AutomationError::new(
                    "GRAMMAR_VARIABLE_NAME",
                    format!("Invalid variable name: {:?}", values[0]),
                ));
            }
            let value = &values[1];
            let is_nested = CommandKind::ALL
                .into_iter()
                .filter(|candidate| candidate.is_value_producer())
                .any(|candidate| {
                    value
                        .strip_prefix(candidate.keyword())
                        .is_some_and(|tail| tail.is_empty() || tail.starts_with(' '))
                });
            if is_nested {
                format!("{} {} {}", kind.keyword(), variable, value)
            } else {
                format!("{} {} {}", kind.keyword(), variable, escape_quoted(value)?)
            }
        }
        _ if expected == 1 => format!("{} {}", kind.keyword(), escape_quoted(&values[0])?),
        _ => {
            if let Some(value) = values.iter().find(|value| value.contains(QUOTED_SEPARATOR)) {
                return Err(AutomationError::new(
                    "GRAMMAR_AMBIGUOUS_VALUE",
                    format!(
                        "Value {:?} contains the argument separator {} and cannot be encoded.",
                        value, QUOTED_SEPARATOR
                    ),
                ));
            }
            let quoted = values
                .iter()
                .map(|value| format!("\"{}\"", value))
                .collect::<Vec<_>>()
                .join(" ");
            format!("{} {}", kind.keyword(), quoted)
        }
    };
    Ok(line)
}

fn escape_quoted(value: &str) -> Result<String, AutomationError> {
    if value.contains(['\n', '\r']) {
        return Err(AutomationError::new(
            "GRAMMAR_LINE_BREAK",
            format!("Value {:?} spans lines and cannot be encoded.", value),
        ));
    }
    Ok(format!(
        "\"{}\"",
        value.replace('\\', "\\\\").replace('"', "\\\"")
    ))
}
