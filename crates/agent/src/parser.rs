//! ReAct response grammar.
//!
//! A completion is scanned for the protocol markers (`Thought:`, `Action:`,
//! `Action Input:`, `Answer:`) and classified as exactly one of a final
//! answer, a tool action, or neither. Markers are case-sensitive.
//!
//! ```text
//! Thought: I should compute this
//! Action: calculator
//! Action Input: {"expression": "2+2"}
//! ```

use ponder_core::tool::ToolArguments;
use serde_json::Value;

/// A protocol marker recognised in model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Thought,
    Action,
    ActionInput,
    Answer,
}

impl Marker {
    const ALL: [Marker; 4] = [
        Marker::Thought,
        Marker::ActionInput,
        Marker::Action,
        Marker::Answer,
    ];

    pub fn text(self) -> &'static str {
        match self {
            Marker::Thought => "Thought:",
            Marker::Action => "Action:",
            Marker::ActionInput => "Action Input:",
            Marker::Answer => "Answer:",
        }
    }
}

/// A marker occurrence and the byte offset just past it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub marker: Marker,
    pub start: usize,
    pub end: usize,
}

/// A tool call extracted from a completion.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedAction {
    pub tool: String,
    pub arguments: ToolArguments,
}

/// Classification of one completion.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    FinalAnswer(String),
    Action(ParsedAction),
    Unparseable,
}

/// Find every marker occurrence, in text order.
///
/// Occurrences may overlap (`Answer:` inside `Final Answer:` is still an
/// `Answer:`), so each marker is searched independently.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Marker::ALL
        .iter()
        .flat_map(|&marker| {
            text.match_indices(marker.text()).map(move |(start, m)| Token {
                marker,
                start,
                end: start + m.len(),
            })
        })
        .collect();
    tokens.sort_by_key(|t| t.start);
    tokens
}

/// Classify a completion.
///
/// A completion that mentions `Action:` is never a final answer, even when it
/// also contains `Answer:`.
pub fn parse(text: &str) -> Parsed {
    let tokens = tokenize(text);
    let first = |marker: Marker| tokens.iter().find(|t| t.marker == marker);

    if first(Marker::Action).is_none() {
        return match first(Marker::Answer) {
            Some(answer) => Parsed::FinalAnswer(answer_text(text, answer.end, &tokens)),
            None => Parsed::Unparseable,
        };
    }

    // The first `Action:` that is followed by an identifier names the tool.
    let named = tokens
        .iter()
        .filter(|t| t.marker == Marker::Action)
        .find_map(|t| identifier_after(text, t.end));

    let Some((tool, name_end)) = named else {
        return Parsed::Unparseable;
    };

    let input = tokens
        .iter()
        .find(|t| t.marker == Marker::ActionInput && t.start >= name_end);

    let arguments = match input {
        Some(token) => input_arguments(&text[token.end..]),
        None => ToolArguments::new(),
    };

    Parsed::Action(ParsedAction {
        tool: tool.to_string(),
        arguments,
    })
}

/// Text after `Answer:` up to the next `Thought:` or end of text.
fn answer_text(text: &str, from: usize, tokens: &[Token]) -> String {
    let until = tokens
        .iter()
        .find(|t| t.marker == Marker::Thought && t.start >= from)
        .map_or(text.len(), |t| t.start);
    text[from..until].trim().to_string()
}

/// An identifier (alphanumerics and `_`) after optional whitespace.
fn identifier_after(text: &str, from: usize) -> Option<(&str, usize)> {
    let rest = &text[from..];
    let skipped = rest.len() - rest.trim_start().len();
    let start = from + skipped;
    let len: usize = text[start..]
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .map(char::len_utf8)
        .sum();
    (len > 0).then(|| (&text[start..start + len], start + len))
}

/// Arguments from whatever follows `Action Input:`.
fn input_arguments(rest: &str) -> ToolArguments {
    let rest = rest.trim_start();
    if !rest.starts_with('{') {
        return ToolArguments::new();
    }
    match object_span(rest) {
        Some(span) => serde_json::from_str::<ToolArguments>(span)
            .unwrap_or_else(|_| fallback_arguments(span)),
        None => ToolArguments::new(),
    }
}

/// The first brace-balanced `{...}` span, or up to the last `}` when the
/// braces never balance. Braces inside JSON strings are ignored.
fn object_span(s: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&s[..=i]);
                }
            }
            _ => {}
        }
    }

    s.rfind('}').map(|end| &s[..=end])
}

/// Line-based `key: value` recovery for inputs that are not valid JSON.
///
/// Never fails; lines without a colon or with an empty key are skipped and
/// every value is kept as a string.
pub fn fallback_arguments(span: &str) -> ToolArguments {
    let body = span.trim();
    let body = body.strip_prefix('{').unwrap_or(body);
    let body = body.strip_suffix('}').unwrap_or(body);

    let mut arguments = ToolArguments::new();
    for line in body.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = unquote(key.trim());
        if key.is_empty() {
            continue;
        }
        let value = unquote(value.trim().trim_end_matches(',').trim_end());
        arguments.insert(key.to_string(), Value::String(value.to_string()));
    }
    arguments
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn action(text: &str) -> ParsedAction {
        match parse(text) {
            Parsed::Action(a) => a,
            other => panic!("expected action, got {other:?}"),
        }
    }

    #[test]
    fn tokenize_orders_markers() {
        let tokens = tokenize("Thought: x\nAction: calc\nAction Input: {}");
        let markers: Vec<Marker> = tokens.iter().map(|t| t.marker).collect();
        assert_eq!(
            markers,
            vec![Marker::Thought, Marker::Action, Marker::ActionInput]
        );
    }

    #[test]
    fn answer_is_trimmed() {
        assert_eq!(
            parse("Thought: compute\nAnswer: 4"),
            Parsed::FinalAnswer("4".into())
        );
        assert_eq!(
            parse("Answer:\n\n  The capital is Paris.  \n"),
            Parsed::FinalAnswer("The capital is Paris.".into())
        );
    }

    #[test]
    fn answer_stops_at_next_thought() {
        let text = "Thought: done\nAnswer: 42\nThought: I am sure";
        assert_eq!(parse(text), Parsed::FinalAnswer("42".into()));
    }

    #[test]
    fn answer_keeps_multiple_lines() {
        let text = "Answer: line one\nline two";
        assert_eq!(parse(text), Parsed::FinalAnswer("line one\nline two".into()));
    }

    #[test]
    fn empty_answer_is_still_final() {
        assert_eq!(parse("Answer:"), Parsed::FinalAnswer(String::new()));
    }

    #[test]
    fn action_with_json_input() {
        let a = action(
            "Thought: I should add\nAction: calculator\nAction Input: {\"expression\": \"2+2\"}",
        );
        assert_eq!(a.tool, "calculator");
        assert_eq!(a.arguments["expression"], json!("2+2"));
    }

    #[test]
    fn action_wins_over_answer() {
        let a = action("Answer: maybe\nAction: search\nAction Input: {\"query\": \"x\"}");
        assert_eq!(a.tool, "search");
    }

    #[test]
    fn action_name_after_newline_whitespace() {
        let a = action("Action:\n   web_search\nAction Input: {}");
        assert_eq!(a.tool, "web_search");
        assert!(a.arguments.is_empty());
    }

    #[test]
    fn missing_input_gives_empty_arguments() {
        let a = action("Thought: list\nAction: list_files");
        assert_eq!(a.tool, "list_files");
        assert!(a.arguments.is_empty());
    }

    #[test]
    fn input_without_object_gives_empty_arguments() {
        let a = action("Action: calculator\nAction Input: 2+2");
        assert!(a.arguments.is_empty());
    }

    #[test]
    fn nested_objects_and_braces_in_strings() {
        let a = action(
            "Action: http\nAction Input: {\"body\": {\"a\": 1}, \"note\": \"}{\"}\nObservation: pending",
        );
        assert_eq!(a.arguments["body"], json!({"a": 1}));
        assert_eq!(a.arguments["note"], json!("}{"));
    }

    #[test]
    fn unbalanced_input_takes_up_to_last_brace() {
        let a = action("Action: calc\nAction Input: {\"expression\": \"1\", {\"x\": 2}");
        // Not valid JSON; the fallback still yields a mapping
        assert_eq!(a.tool, "calc");
        assert!(a.arguments.contains_key("expression"));
    }

    #[test]
    fn malformed_json_falls_back_to_lines() {
        let a = action("Action: search\nAction Input: {\n  query: rust async\n  count: 3,\n}");
        assert_eq!(a.arguments["query"], json!("rust async"));
        assert_eq!(a.arguments["count"], json!("3"));
    }

    #[test]
    fn fallback_never_fails() {
        assert!(fallback_arguments("{}").is_empty());
        assert!(fallback_arguments("{ no colon here }").is_empty());
        assert!(fallback_arguments("{: value}").is_empty());

        let args = fallback_arguments("{\"url\": \"http://x.org\"}");
        assert_eq!(args["url"], json!("http://x.org"));
    }

    #[test]
    fn action_without_identifier_is_unparseable() {
        assert_eq!(parse("Action: {\"x\": 1}"), Parsed::Unparseable);
    }

    #[test]
    fn later_action_marker_can_name_the_tool() {
        let a = action("Action: -\nThought: retry\nAction: calculator\nAction Input: {}");
        assert_eq!(a.tool, "calculator");
    }

    #[test]
    fn input_marker_before_action_is_ignored() {
        let a = action("Action Input: {\"a\": 1}\nAction: calc");
        assert!(a.arguments.is_empty());
    }

    #[test]
    fn plain_text_is_unparseable() {
        assert_eq!(parse("I am thinking about it."), Parsed::Unparseable);
        assert_eq!(parse(""), Parsed::Unparseable);
        assert_eq!(parse("answer: lowercase"), Parsed::Unparseable);
    }
}
