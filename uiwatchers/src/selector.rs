use std::fmt;

/// Represents ways to locate an on-screen element
///
/// Selectors are declarative: resolving one against the live UI tree is the
/// job of the [`ScreenQuery`](crate::ScreenQuery) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Select by implementation class name (e.g. `android.widget.Button`)
    ClassName(String),
    /// Select by exact text
    Text(String),
    /// Select by a substring of the text
    TextContains(String),
    /// Select by the package owning the window the element lives in
    PackageName(String),
    /// Select by resource id (e.g. `android:id/button1`)
    ResourceId(String),
    /// Filter by enabled state
    Enabled(bool),
    /// Select elements that have at least one descendant matching the inner selector
    Has(Box<Selector>),
    /// Logical AND: all selectors must match the same element
    And(Vec<Selector>),
    /// Represents an invalid selector string, with a reason.
    Invalid(String),
}

impl Selector {
    pub fn class_name(class_name: impl Into<String>) -> Self {
        Selector::ClassName(class_name.into())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Selector::Text(text.into())
    }

    pub fn text_contains(fragment: impl Into<String>) -> Self {
        Selector::TextContains(fragment.into())
    }

    pub fn package_name(package: impl Into<String>) -> Self {
        Selector::PackageName(package.into())
    }

    pub fn resource_id(id: impl Into<String>) -> Self {
        Selector::ResourceId(id.into())
    }

    pub fn enabled(enabled: bool) -> Self {
        Selector::Enabled(enabled)
    }

    pub fn has(inner: Selector) -> Self {
        Selector::Has(Box::new(inner))
    }

    /// Conjoin two selectors, flattening nested `And`s so that
    /// `a.and(b).and(c)` yields a single three-element conjunction.
    pub fn and(self, other: Selector) -> Self {
        let mut parts = match self {
            Selector::And(parts) => parts,
            s => vec![s],
        };
        match other {
            Selector::And(mut more) => parts.append(&mut more),
            s => parts.push(s),
        }
        Selector::And(parts)
    }

    /// False if this selector, or any part of it, failed to parse.
    pub fn is_valid(&self) -> bool {
        match self {
            Selector::Invalid(_) => false,
            Selector::Has(inner) => inner.is_valid(),
            Selector::And(parts) => parts.iter().all(Selector::is_valid),
            _ => true,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::ClassName(v) => write!(f, "classname:{}", Value(v)),
            Selector::Text(v) => write!(f, "text:{}", Value(v)),
            Selector::TextContains(v) => write!(f, "textcontains:{}", Value(v)),
            Selector::PackageName(v) => write!(f, "package:{}", Value(v)),
            Selector::ResourceId(v) => write!(f, "resourceid:{}", Value(v)),
            Selector::Enabled(v) => write!(f, "enabled:{v}"),
            Selector::Has(inner) => match &**inner {
                Selector::And(_) => write!(f, "has:({inner})"),
                _ => write!(f, "has:{inner}"),
            },
            Selector::And(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" && ")?;
                    }
                    write!(f, "{part}")?;
                }
                Ok(())
            }
            Selector::Invalid(reason) => write!(f, "invalid:{reason}"),
        }
    }
}

/// Attribute value as written in selector strings. Values the parser would
/// otherwise misread are double-quoted, with `"` and `\` backslash-escaped.
struct Value<'a>(&'a str);

impl Value<'_> {
    fn needs_quoting(&self) -> bool {
        self.0 != self.0.trim()
            || self
                .0
                .chars()
                .any(|c| matches!(c, '&' | '(' | ')' | '"' | '\\'))
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.needs_quoting() {
            return f.write_str(self.0);
        }
        f.write_str("\"")?;
        for c in self.0.chars() {
            if c == '"' || c == '\\' {
                f.write_str("\\")?;
            }
            write!(f, "{c}")?;
        }
        f.write_str("\"")
    }
}

impl From<&str> for Selector {
    fn from(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() {
            return Selector::Invalid("Empty selector".to_string());
        }

        let parts = match split_top_level_and(s) {
            Ok(parts) => parts,
            Err(reason) => return Selector::Invalid(reason),
        };

        if parts.len() == 1 {
            return parse_atom(parts[0]);
        }

        let mut selectors = Vec::with_capacity(parts.len());
        for part in parts {
            if part.trim().is_empty() {
                return Selector::Invalid(format!("Empty operand around '&&' in \"{s}\""));
            }
            match parse_atom(part) {
                invalid @ Selector::Invalid(_) => return invalid,
                Selector::And(mut nested) => selectors.append(&mut nested),
                atom => selectors.push(atom),
            }
        }
        Selector::And(selectors)
    }
}

impl From<String> for Selector {
    fn from(s: String) -> Self {
        Selector::from(s.as_str())
    }
}

/// Split on `&&` outside of parentheses and quoted values.
fn split_top_level_and(s: &str) -> Result<Vec<&str>, String> {
    let bytes = s.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut in_quotes = false;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if in_quotes {
            match bytes[i] {
                b'\\' => i += 1,
                b'"' => in_quotes = false,
                _ => {}
            }
            i += 1;
            continue;
        }
        match bytes[i] {
            b'"' => in_quotes = true,
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(format!("Unbalanced ')' in selector \"{s}\""));
                }
            }
            b'&' if depth == 0 && bytes.get(i + 1) == Some(&b'&') => {
                parts.push(&s[start..i]);
                i += 2;
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    if in_quotes {
        return Err(format!("Unterminated quote in selector \"{s}\""));
    }
    if depth != 0 {
        return Err(format!("Unbalanced '(' in selector \"{s}\""));
    }
    parts.push(&s[start..]);
    Ok(parts)
}

/// Undo the quoting applied by `Display`. Unquoted values pass through as is.
fn unquote(value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    let Some(rest) = trimmed.strip_prefix('"') else {
        return Ok(value.to_string());
    };

    let mut out = String::with_capacity(rest.len());
    let mut chars = rest.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) => out.push(escaped),
                None => break,
            },
            '"' => {
                if !chars.as_str().trim().is_empty() {
                    return Err(format!("Unexpected text after quoted value {trimmed}"));
                }
                return Ok(out);
            }
            c => out.push(c),
        }
    }
    Err(format!("Unterminated quoted value {trimmed}"))
}

fn parse_atom(s: &str) -> Selector {
    let s = s.trim();
    if let Some(inner) = s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        return Selector::from(inner);
    }

    let Some((prefix, value)) = s.split_once(':') else {
        return Selector::Invalid(format!(
            "Unknown selector format: \"{s}\". Use prefixes like 'classname:', 'text:', 'textcontains:', 'package:', 'resourceid:', 'enabled:' or 'has:'."
        ));
    };

    let prefix = prefix.trim().to_lowercase();
    let attribute = |build: fn(String) -> Selector| match unquote(value) {
        Ok(v) => build(v),
        Err(reason) => Selector::Invalid(reason),
    };

    match prefix.as_str() {
        "classname" | "class" => attribute(Selector::ClassName),
        "text" => attribute(Selector::Text),
        "textcontains" => attribute(Selector::TextContains),
        "package" | "packagename" => attribute(Selector::PackageName),
        "resourceid" | "id" => attribute(Selector::ResourceId),
        "enabled" => match value.trim().to_lowercase().as_str() {
            "true" => Selector::Enabled(true),
            "false" => Selector::Enabled(false),
            other => Selector::Invalid(format!("Invalid value for enabled selector: '{other}'")),
        },
        "has" => match Selector::from(value) {
            invalid @ Selector::Invalid(_) => invalid,
            inner => Selector::Has(Box::new(inner)),
        },
        other => Selector::Invalid(format!("Unknown selector prefix '{other}' in \"{s}\"")),
    }
}
