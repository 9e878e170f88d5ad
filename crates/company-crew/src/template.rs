//! `str.format`-style placeholder substitution for task descriptions.
//!
//! `{name}` is replaced by the matching variable, `{{` and `}}` produce
//! literal braces. Unknown names, positional `{}` fields, format specs and
//! unbalanced braces are errors.

use company_core::{CompanyError, CompanyResult};

/// Substitute `{name}` placeholders from `vars`. `{{` and `}}` are literal braces.
pub fn render(template: &str, vars: &[(&str, &str)]) -> CompanyResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    match c {
                        '}' => {
                            closed = true;
                            break;
                        }
                        '{' => {
                            return Err(CompanyError::Template(format!(
                                "unexpected '{{' inside placeholder at byte {pos}"
                            )));
                        }
                        other => name.push(other),
                    }
                }
                if !closed {
                    return Err(CompanyError::Template(format!(
                        "unbalanced '{{' at byte {pos}"
                    )));
                }
                out.push_str(lookup(&name, vars)?);
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                out.push('}');
            }
            '}' => {
                return Err(CompanyError::Template(format!(
                    "single '}}' encountered at byte {pos}"
                )));
            }
            other => out.push(other),
        }
    }

    Ok(out)
}

fn lookup<'a>(name: &str, vars: &[(&str, &'a str)]) -> CompanyResult<&'a str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CompanyError::Template(
            "positional placeholder '{}' is not supported".to_string(),
        ));
    }
    vars.iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| *value)
        .ok_or_else(|| CompanyError::Template(format!("unknown placeholder '{{{name}}}'")))
}
