//! Rendering of console call arguments into a single line of text.
//!
//! The rules mirror a typical structured console formatter:
//!
//! - `dir` renders only its first argument, inspected.
//! - A leading string argument may carry `%` directives (`%s`, `%d`, `%i`,
//!   `%f`, `%j`, `%o`, `%O`, `%c`, `%%`) that consume the following arguments.
//!   A directive with no argument left is kept literally.
//! - Remaining arguments are joined with a single space. Top-level strings are
//!   written raw, every other value is inspected.
//!
//! Inspection writes nested strings in single quotes, arrays as `[ a, b ]` and
//! objects as `{ key: value }`.

use crate::record::Severity;
use serde_json::{Map, Number, Value};

/// Render the arguments of one console call for the given severity.
pub fn render(severity: Severity, args: &[Value]) -> String {
    if severity == Severity::Dir {
        return args.first().map(inspect).unwrap_or_default();
    }
    format_values(args)
}

/// Join an argument list the way `log`-style methods do.
pub fn format_values(args: &[Value]) -> String {
    let Some((first, rest)) = args.split_first() else {
        return String::new();
    };

    let mut parts = Vec::with_capacity(args.len());
    let rest = match first {
        Value::String(template) => {
            let (text, consumed) = expand_directives(template, rest);
            parts.push(text);
            &rest[consumed..]
        }
        other => {
            parts.push(inspect(other));
            rest
        }
    };

    for arg in rest {
        match arg {
            Value::String(s) => parts.push(s.clone()),
            other => parts.push(inspect(other)),
        }
    }
    parts.join(" ")
}

/// Expand `%` directives in `template`, returning the text and the number of
/// arguments consumed.
fn expand_directives(template: &str, args: &[Value]) -> (String, usize) {
    if args.is_empty() {
        return (template.to_string(), 0);
    }

    let mut out = String::with_capacity(template.len());
    let mut used = 0;
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let Some(&directive) = chars.peek() else {
            out.push('%');
            break;
        };
        if directive == '%' {
            chars.next();
            out.push('%');
            continue;
        }
        if !matches!(directive, 's' | 'd' | 'i' | 'f' | 'j' | 'o' | 'O' | 'c') {
            out.push('%');
            continue;
        }
        chars.next();
        let Some(arg) = args.get(used) else {
            out.push('%');
            out.push(directive);
            continue;
        };
        used += 1;
        match directive {
            's' => out.push_str(&string_form(arg)),
            'd' => out.push_str(&to_number(arg).map(format_f64).unwrap_or_else(nan)),
            'i' => out.push_str(&to_integer(arg).map(format_f64).unwrap_or_else(nan)),
            'f' => out.push_str(&to_float(arg).map(format_f64).unwrap_or_else(nan)),
            'j' => out.push_str(&serde_json::to_string(arg).unwrap_or_else(|_| "undefined".to_string())),
            'o' | 'O' => out.push_str(&inspect(arg)),
            // %c carries styling, which has no textual effect
            _ => {}
        }
    }

    (out, used)
}

fn nan() -> String {
    "NaN".to_string()
}

fn string_form(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => inspect(other),
    }
}

fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    }
}

fn to_integer(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().map(f64::trunc),
        Value::String(s) => leading_number(s, false).map(f64::trunc),
        _ => None,
    }
}

fn to_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => leading_number(s, true),
        _ => None,
    }
}

/// Parse the longest numeric prefix of `s`, ignoring leading whitespace.
fn leading_number(s: &str, allow_fraction: bool) -> Option<f64> {
    let s = s.trim_start();
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        let ok = c.is_ascii_digit()
            || (i == 0 && (c == '-' || c == '+'))
            || (allow_fraction && c == '.' && !seen_dot);
        if !ok {
            break;
        }
        if c == '.' {
            seen_dot = true;
        }
        end = i + c.len_utf8();
    }
    s[..end].parse::<f64>().ok()
}

fn format_f64(f: f64) -> String {
    if f.is_nan() {
        nan()
    } else if f.is_infinite() {
        if f > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() }
    } else if f.fract() == 0.0 && f.abs() < 1e21 {
        format!("{:.0}", f)
    } else {
        f.to_string()
    }
}

fn format_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        n.as_f64().map(format_f64).unwrap_or_else(nan)
    }
}

/// Inspect a value. Strings are quoted at every depth.
pub fn inspect(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(n),
        Value::String(s) => quote(s),
        Value::Array(items) => {
            if items.is_empty() {
                "[]".to_string()
            } else {
                let inner: Vec<String> = items.iter().map(inspect).collect();
                format!("[ {} ]", inner.join(", "))
            }
        }
        Value::Object(map) => inspect_object(map),
    }
}

fn inspect_object(map: &Map<String, Value>) -> String {
    if map.is_empty() {
        return "{}".to_string();
    }
    let inner: Vec<String> = map
        .iter()
        .map(|(key, value)| {
            let key = if is_identifier(key) { key.clone() } else { quote(key) };
            format!("{}: {}", key, inspect(value))
        })
        .collect();
    format!("{{ {} }}", inner.join(", "))
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn joins_arguments_with_spaces() {
        assert_eq!(format_values(&[json!("a"), json!(1)]), "a 1");
        assert_eq!(format_values(&[json!("log-string-test"), json!(72)]), "log-string-test 72");
        assert_eq!(format_values(&[json!(1), json!("b"), json!(true)]), "1 b true");
    }

    #[test]
    fn no_arguments_render_empty() {
        assert_eq!(render(Severity::Log, &[]), "");
        assert_eq!(render(Severity::Dir, &[]), "");
    }

    #[test]
    fn inspects_objects_and_arrays() {
        assert_eq!(
            format_values(&[json!("opts"), json!({ "showHidden": true })]),
            "opts { showHidden: true }"
        );
        assert_eq!(inspect(&json!({ "a-b": [1, "x"], "c": {} })), "{ 'a-b': [ 1, 'x' ], c: {} }");
        assert_eq!(inspect(&json!([])), "[]");
        assert_eq!(inspect(&json!(2.0)), "2");
        assert_eq!(inspect(&json!(2.5)), "2.5");
    }

    #[test]
    fn expands_directives() {
        assert_eq!(format_values(&[json!("%s=%d"), json!("n"), json!("42")]), "n=42");
        assert_eq!(format_values(&[json!("%i|%f"), json!("12.7px"), json!("3.5kg")]), "12|3.5");
        assert_eq!(format_values(&[json!("%j"), json!({ "k": [1] })]), r#"{"k":[1]}"#);
        assert_eq!(format_values(&[json!("%d"), json!({})]), "NaN");
        assert_eq!(format_values(&[json!("100%% %c done"), json!("color: red")]), "100%  done");
    }

    #[test]
    fn directive_without_argument_stays_literal() {
        assert_eq!(format_values(&[json!("%s and %s"), json!("one")]), "one and %s");
        assert_eq!(format_values(&[json!("50%%")]), "50%%");
        assert_eq!(format_values(&[json!("%x"), json!(1)]), "%x 1");
    }

    #[test]
    fn extra_arguments_follow_expanded_template() {
        assert_eq!(format_values(&[json!("%s"), json!("a"), json!("b"), json!(3)]), "a b 3");
    }

    #[test]
    fn dir_inspects_only_first_argument() {
        assert_eq!(render(Severity::Dir, &[json!("dir-string-test"), json!(72)]), "'dir-string-test'");
        assert_eq!(render(Severity::Dir, &[json!({ "it's": "q" })]), r"{ 'it\'s': 'q' }");
    }
}
