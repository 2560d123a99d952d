#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine<'a> {
    pub keyword: &'a str,
    pub args: &'a str,
}

/// Splits a script line into its keyword and the untouched remainder.
/// Blank lines yield `None`.
pub fn split_line(line: &str) -> Option<ScriptLine<'_>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    Some(match line.split_once(' ') {
        Some((keyword, args)) => ScriptLine { keyword, args },
        None => ScriptLine {
            keyword: line,
            args: "",
        },
    })
}

/// Raw script lines; the cursor indexes into this sequence, blank lines
/// included.
pub fn script_lines(script: &str) -> Vec<&str> {
    if script.is_empty() {
        return Vec::new();
    }
    script
        .split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .collect()
}
