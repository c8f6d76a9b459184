//! Decoder for field annotation strings.
//!
//! An annotation is a space-separated list of `key:"value"` pairs, where the
//! value is a double-quoted string using the usual backslash escapes and is
//! split on `,` into a name followed by options:
//!
//! ```
//! use typegraph::Tags;
//!
//! let tags = Tags::parse(r#"json:"id,omitempty" db:"user_id""#).unwrap();
//! let json = tags.get("json").unwrap();
//! assert_eq!(json.name, "id");
//! assert!(json.has_option("omitempty"));
//! assert_eq!(tags.keys(), ["json", "db"]);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("bad syntax for struct tag pair")]
    Syntax,
    #[error("bad syntax for struct tag key")]
    KeySyntax,
    #[error("bad syntax for struct tag value")]
    ValueSyntax,
    #[error("tag key does not exist")]
    KeyNotSet,
    #[error("tag does not exist")]
    NotExist,
    #[error("mismatch between key and tag.key")]
    KeyMismatch,
}

/// One decoded `key:"name,opt,..."` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub key: String,
    pub name: String,
    pub options: Vec<String>,
}

impl Tag {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            options: Vec::new(),
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.extend(options.into_iter().map(Into::into));
        self
    }

    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    /// Name and options joined back into the raw value.
    pub fn value(&self) -> String {
        let mut value = self.name.clone();
        for option in &self.options {
            value.push(',');
            value.push_str(option);
        }
        value
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key, quote(&self.value()))
    }
}

/// Ordered set of decoded tags for one field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tags {
    tags: Vec<Tag>,
}

impl Tags {
    pub fn parse(raw: &str) -> Result<Self, TagError> {
        let bytes = raw.as_bytes();
        let mut tags = Vec::new();
        let mut i = 0;

        loop {
            while i < bytes.len() && bytes[i] == b' ' {
                i += 1;
            }
            if i >= bytes.len() {
                break;
            }

            let start = i;
            while i < bytes.len()
                && bytes[i] > b' '
                && bytes[i] != b':'
                && bytes[i] != b'"'
                && bytes[i] != 0x7f
            {
                i += 1;
            }
            if i == start {
                return Err(TagError::KeySyntax);
            }
            if i + 1 >= bytes.len() || bytes[i] != b':' {
                return Err(TagError::Syntax);
            }
            if bytes[i + 1] != b'"' {
                return Err(TagError::ValueSyntax);
            }
            let key = &raw[start..i];

            i += 1;
            let quote_start = i;
            i += 1;
            while i < bytes.len() && bytes[i] != b'"' {
                if bytes[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
            if i >= bytes.len() {
                return Err(TagError::ValueSyntax);
            }
            let quoted = &raw[quote_start..=i];
            i += 1;

            let value = unquote(quoted).ok_or(TagError::ValueSyntax)?;
            let mut parts = value.split(',');
            let name = parts.next().unwrap_or_default().to_string();
            tags.push(Tag {
                key: key.to_string(),
                name,
                options: parts.map(str::to_string).collect(),
            });
        }

        Ok(Self { tags })
    }

    pub fn get(&self, key: &str) -> Result<&Tag, TagError> {
        self.tags
            .iter()
            .find(|tag| tag.key == key)
            .ok_or(TagError::NotExist)
    }

    /// Replaces the tag with the same key in place, or appends it.
    pub fn set(&mut self, tag: Tag) -> Result<(), TagError> {
        if tag.key.is_empty() {
            return Err(TagError::KeyNotSet);
        }
        match self.tags.iter_mut().find(|existing| existing.key == tag.key) {
            Some(existing) => *existing = tag,
            None => self.tags.push(tag),
        }
        Ok(())
    }

    /// Swaps the tag stored under `key`; the replacement must carry the same key.
    pub fn replace(&mut self, key: &str, tag: Tag) -> Result<Tag, TagError> {
        if key.is_empty() {
            return Err(TagError::KeyNotSet);
        }
        if tag.key != key {
            return Err(TagError::KeyMismatch);
        }
        let existing = self
            .tags
            .iter_mut()
            .find(|existing| existing.key == key)
            .ok_or(TagError::NotExist)?;
        Ok(std::mem::replace(existing, tag))
    }

    /// Appends options not already present. Missing keys are ignored.
    pub fn add_options(&mut self, key: &str, options: &[&str]) {
        if let Some(tag) = self.tags.iter_mut().find(|tag| tag.key == key) {
            for option in options {
                if !tag.has_option(option) {
                    tag.options.push((*option).to_string());
                }
            }
        }
    }

    pub fn delete_options(&mut self, key: &str, options: &[&str]) {
        if let Some(tag) = self.tags.iter_mut().find(|tag| tag.key == key) {
            tag.options.retain(|option| !options.contains(&option.as_str()));
        }
    }

    pub fn delete(&mut self, keys: &[&str]) {
        self.tags.retain(|tag| !keys.contains(&tag.key.as_str()));
    }

    pub fn keys(&self) -> Vec<&str> {
        self.tags.iter().map(|tag| tag.key.as_str()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Stable sort by key.
    pub fn sort(&mut self) {
        self.tags.sort_by(|a, b| a.key.cmp(&b.key));
    }
}

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, tag) in self.tags.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{tag}")?;
        }
        Ok(())
    }
}

impl FromStr for Tags {
    type Err = TagError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

impl<'a> IntoIterator for &'a Tags {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn take_digits(chars: &mut std::str::Chars<'_>, count: usize, radix: u32) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..count {
        value = value * radix + chars.next()?.to_digit(radix)?;
    }
    Some(value)
}

/// Decodes a double-quoted literal. `None` on any malformed escape.
fn unquote(quoted: &str) -> Option<String> {
    let inner = quoted.strip_prefix('"')?.strip_suffix('"')?;
    let mut out: Vec<u8> = Vec::with_capacity(inner.len());
    let mut chars = inner.chars();
    let mut buf = [0u8; 4];

    while let Some(c) = chars.next() {
        match c {
            '"' | '\n' => return None,
            '\\' => match chars.next()? {
                'a' => out.push(0x07),
                'b' => out.push(0x08),
                'f' => out.push(0x0c),
                'n' => out.push(b'\n'),
                'r' => out.push(b'\r'),
                't' => out.push(b'\t'),
                'v' => out.push(0x0b),
                '\\' => out.push(b'\\'),
                '"' => out.push(b'"'),
                'x' => out.push(u8::try_from(take_digits(&mut chars, 2, 16)?).ok()?),
                digit @ '0'..='7' => {
                    let high = digit.to_digit(8)?;
                    let low = take_digits(&mut chars, 2, 8)?;
                    out.push(u8::try_from(high * 64 + low).ok()?);
                }
                'u' => {
                    let c = char::from_u32(take_digits(&mut chars, 4, 16)?)?;
                    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                }
                'U' => {
                    let c = char::from_u32(take_digits(&mut chars, 8, 16)?)?;
                    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                }
                _ => return None,
            },
            c => out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes()),
        }
    }

    String::from_utf8(out).ok()
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn parses_name_and_options() {
        let tags = Tags::parse(r#"json:"foo,omitempty,string" xml:"foo""#).unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(
            tags.get("json").unwrap(),
            &Tag::new("json", "foo").with_options(["omitempty", "string"])
        );
        assert_eq!(tags.get("xml").unwrap().options, Vec::<String>::new());
    }

    #[rstest]
    #[case::empty("")]
    #[case::spaces("   ")]
    fn blank_input_is_empty(#[case] raw: &str) {
        assert!(Tags::parse(raw).unwrap().is_empty());
    }

    #[rstest]
    #[case::leading_colon(r#":"foo""#, TagError::KeySyntax)]
    #[case::leading_quote(r#""json":"foo""#, TagError::KeySyntax)]
    #[case::missing_colon("json", TagError::Syntax)]
    #[case::colon_at_end("json:", TagError::Syntax)]
    #[case::unquoted_value("json:foo", TagError::ValueSyntax)]
    #[case::unterminated(r#"json:"foo"#, TagError::ValueSyntax)]
    #[case::bad_escape(r#"json:"fo\qo""#, TagError::ValueSyntax)]
    #[case::trailing_backslash(r#"json:"foo\"#, TagError::ValueSyntax)]
    fn rejects_malformed(#[case] raw: &str, #[case] expected: TagError) {
        assert_eq!(Tags::parse(raw), Err(expected));
    }

    #[test]
    fn decodes_escapes() {
        let tags = Tags::parse(r#"doc:"say \"hi\"\té\101""#).unwrap();
        assert_eq!(tags.get("doc").unwrap().name, "say \"hi\"\t\u{e9}A");
    }

    #[test]
    fn set_replaces_in_place_and_appends() {
        let mut tags = Tags::parse(r#"json:"foo" xml:"bar""#).unwrap();
        tags.set(Tag::new("json", "renamed")).unwrap();
        tags.set(Tag::new("db", "col")).unwrap();
        assert_eq!(tags.to_string(), r#"json:"renamed" xml:"bar" db:"col""#);
        assert_eq!(tags.set(Tag::new("", "x")), Err(TagError::KeyNotSet));
    }

    #[test]
    fn replace_requires_matching_key() {
        let mut tags = Tags::parse(r#"json:"foo""#).unwrap();
        assert_eq!(
            tags.replace("json", Tag::new("xml", "foo")),
            Err(TagError::KeyMismatch)
        );
        assert_eq!(
            tags.replace("db", Tag::new("db", "foo")),
            Err(TagError::NotExist)
        );
        let old = tags.replace("json", Tag::new("json", "bar")).unwrap();
        assert_eq!(old.name, "foo");
        assert_eq!(tags.get("json").unwrap().name, "bar");
    }

    #[test]
    fn option_editing_and_delete() {
        let mut tags = Tags::parse(r#"json:"foo,a" xml:"bar" db:"baz""#).unwrap();
        tags.add_options("json", &["a", "b"]);
        tags.delete_options("json", &["a"]);
        tags.add_options("missing", &["x"]);
        tags.delete(&["xml"]);
        tags.sort();
        assert_eq!(tags.keys(), ["db", "json"]);
        assert_eq!(tags.to_string(), r#"db:"baz" json:"foo,b""#);
    }

    #[test]
    fn missing_key_is_not_exist() {
        let tags = Tags::default();
        assert_eq!(tags.get("json"), Err(TagError::NotExist));
    }

    #[test]
    fn display_escapes_quotes() {
        let tag = Tag::new("doc", "a\"b");
        assert_eq!(tag.to_string(), r#"doc:"a\"b""#);
    }
}
