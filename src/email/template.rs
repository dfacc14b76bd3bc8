//! Email template rendering.
//!
//! Templates are stored in the database and rendered in-process before
//! dispatch. The supported syntax is deliberately small:
//!
//! - `{{path}}` substitution, with dotted paths into the context
//! - `{{#if cond}}…{{/if}}` conditional sections
//! - `{{#each arr}}…{{/each}}` repeated sections; inside the block,
//!   lookups resolve against the current item first, `{{this}}` is the
//!   item itself
//!
//! Unknown variables render as empty strings; an unclosed block renders
//! the remaining text literally rather than failing the email.

use serde_json::Value;

/// Render a template against a JSON context
pub fn render_template(template: &str, context: &Value) -> String {
    render_scope(template, context, context)
}

fn render_scope(template: &str, scope: &Value, root: &Value) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        if let Some(cond) = after.strip_prefix("#if ") {
            let Some(tag_end) = cond.find("}}") else {
                out.push_str(&rest[start..]);
                return out;
            };
            let path = cond[..tag_end].trim();
            let body = &cond[tag_end + 2..];
            let Some((inner, consumed)) = block_body(body, "{{#if", "{{/if}}") else {
                out.push_str(&rest[start..]);
                return out;
            };
            if lookup(scope, root, path).map_or(false, is_truthy) {
                out.push_str(&render_scope(inner, scope, root));
            }
            rest = &body[consumed..];
        } else if let Some(each) = after.strip_prefix("#each ") {
            let Some(tag_end) = each.find("}}") else {
                out.push_str(&rest[start..]);
                return out;
            };
            let path = each[..tag_end].trim();
            let body = &each[tag_end + 2..];
            let Some((inner, consumed)) = block_body(body, "{{#each", "{{/each}}") else {
                out.push_str(&rest[start..]);
                return out;
            };
            if let Some(Value::Array(items)) = lookup(scope, root, path) {
                for item in items {
                    out.push_str(&render_scope(inner, item, root));
                }
            }
            rest = &body[consumed..];
        } else {
            let Some(tag_end) = after.find("}}") else {
                out.push_str(&rest[start..]);
                return out;
            };
            let path = after[..tag_end].trim();
            if let Some(value) = lookup(scope, root, path) {
                out.push_str(&value_to_string(value));
            }
            rest = &after[tag_end + 2..];
        }
    }

    out.push_str(rest);
    out
}

/// Find the body of a block, honoring nested blocks of the same kind.
/// Returns the inner text and the offset just past the closing tag.
fn block_body<'a>(body: &'a str, open: &str, close: &str) -> Option<(&'a str, usize)> {
    let mut depth = 1usize;
    let mut idx = 0usize;

    while idx < body.len() {
        let rest = &body[idx..];
        if rest.starts_with(open) {
            depth += 1;
            idx += open.len();
        } else if rest.starts_with(close) {
            depth -= 1;
            if depth == 0 {
                return Some((&body[..idx], idx + close.len()));
            }
            idx += close.len();
        } else {
            idx += rest.chars().next().map_or(1, |c| c.len_utf8());
        }
    }

    None
}

fn lookup<'a>(scope: &'a Value, root: &'a Value, path: &str) -> Option<&'a Value> {
    if path == "this" {
        return Some(scope);
    }

    let resolve = |base: &'a Value| {
        let mut current = base;
        for segment in path.split('.') {
            current = current.get(segment)?;
        }
        Some(current)
    };

    resolve(scope).or_else(|| {
        if std::ptr::eq(scope, root) {
            None
        } else {
            resolve(root)
        }
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(_) => true,
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_variable_substitution() {
        let ctx = json!({ "guest_first_name": "Anna" });
        assert_eq!(
            render_template("Hallo {{guest_first_name}}!", &ctx),
            "Hallo Anna!"
        );
    }

    #[test]
    fn test_missing_variable_renders_empty() {
        let ctx = json!({});
        assert_eq!(render_template("Hallo {{unknown}}!", &ctx), "Hallo !");
    }

    #[test]
    fn test_dotted_path() {
        let ctx = json!({ "bank": { "iban": "DE02120300000000202051" } });
        assert_eq!(
            render_template("IBAN: {{bank.iban}}", &ctx),
            "IBAN: DE02120300000000202051"
        );
    }

    #[test]
    fn test_number_rendering() {
        let ctx = json!({ "nights": 7 });
        assert_eq!(render_template("{{nights}} Nächte", &ctx), "7 Nächte");
    }

    #[test]
    fn test_if_true_renders_body() {
        let ctx = json!({ "deposit_paid": true });
        assert_eq!(
            render_template("{{#if deposit_paid}}bezahlt{{/if}}", &ctx),
            "bezahlt"
        );
    }

    #[test]
    fn test_if_false_skips_body() {
        let ctx = json!({ "deposit_paid": false, "empty": "" });
        assert_eq!(
            render_template("{{#if deposit_paid}}bezahlt{{/if}}", &ctx),
            ""
        );
        assert_eq!(render_template("{{#if empty}}x{{/if}}", &ctx), "");
        assert_eq!(render_template("{{#if missing}}x{{/if}}", &ctx), "");
    }

    #[test]
    fn test_each_over_objects() {
        let ctx = json!({
            "fees": [
                { "name": "Endreinigung", "amount": "50.00" },
                { "name": "Frühstück", "amount": "100.00" }
            ]
        });
        let rendered = render_template("{{#each fees}}{{name}}: {{amount}} €\n{{/each}}", &ctx);
        assert_eq!(rendered, "Endreinigung: 50.00 €\nFrühstück: 100.00 €\n");
    }

    #[test]
    fn test_each_over_scalars_with_this() {
        let ctx = json!({ "tags": ["See", "Berge"] });
        assert_eq!(
            render_template("{{#each tags}}[{{this}}]{{/each}}", &ctx),
            "[See][Berge]"
        );
    }

    #[test]
    fn test_each_falls_back_to_root_scope() {
        let ctx = json!({
            "reference": "CB-1A2B3C",
            "fees": [{ "name": "Endreinigung" }]
        });
        let rendered = render_template("{{#each fees}}{{name}} ({{reference}}){{/each}}", &ctx);
        assert_eq!(rendered, "Endreinigung (CB-1A2B3C)");
    }

    #[test]
    fn test_nested_if_inside_each() {
        let ctx = json!({
            "lines": [
                { "name": "A", "online": true },
                { "name": "B", "online": false }
            ]
        });
        let rendered =
            render_template("{{#each lines}}{{#if online}}{{name}}{{/if}}{{/each}}", &ctx);
        assert_eq!(rendered, "A");
    }

    #[test]
    fn test_nested_if_inside_if() {
        let ctx = json!({ "a": true, "b": true });
        let rendered = render_template("{{#if a}}x{{#if b}}y{{/if}}z{{/if}}", &ctx);
        assert_eq!(rendered, "xyz");
    }

    #[test]
    fn test_unclosed_block_renders_literally() {
        let ctx = json!({ "a": true });
        let rendered = render_template("start {{#if a}}body", &ctx);
        assert_eq!(rendered, "start {{#if a}}body");
    }

    #[test]
    fn test_empty_array_renders_nothing() {
        let ctx = json!({ "fees": [] });
        assert_eq!(render_template("{{#each fees}}x{{/each}}", &ctx), "");
    }
}
