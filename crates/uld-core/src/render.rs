//! # Object Rendering
//!
//! Turns a live object into one line of text, driven purely by the metadata
//! the runtime hands over:
//!
//! | Dynamic type      | Output                                         |
//! |-------------------|------------------------------------------------|
//! | string            | `String "text with \" escaped"`                |
//! | inline array      | `Point[] { Point, Point }`                     |
//! | reference array   | `Node[] { Node @ 0x..., null }`                |
//! | anything else     | `App.Node`                                     |
//!
//! Callers must have checked that the address is a live object; the
//! console does this before it calls in here.

use crate::error::UldResult;
use crate::object::{ObjectBody, ObjectView};
use crate::runtime::Runtime;
use crate::types::Address;

/// Rendered in place of a type name when a slot's tag is not recognized.
const UNKNOWN_TYPE: &str = "<unknown>";

/// Escape every `"` as `\"` and wrap the result in double quotes.
///
/// Bytes that are not valid UTF-8 are shown as U+FFFD.
///
/// ```rust
/// use uld_core::render::quote_string;
///
/// assert_eq!(quote_string(br#"He"lo"#), r#""He\"lo""#);
/// ```
pub fn quote_string(bytes: &[u8]) -> String
{
    let text = String::from_utf8_lossy(bytes);
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        if c == '"' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Renders objects and their fields for the console.
#[derive(Clone, Copy)]
pub struct ObjectRenderer<'rt>
{
    runtime: &'rt dyn Runtime,
}

impl<'rt> ObjectRenderer<'rt>
{
    /// Create a renderer over `runtime`.
    pub fn new(runtime: &'rt dyn Runtime) -> Self
    {
        Self { runtime }
    }

    /// Render the object at `address`.
    ///
    /// ## Errors
    ///
    /// Any decoding error from [`ObjectView`]; nothing is printed in that case.
    pub fn render(&self, address: Address) -> UldResult<String>
    {
        let view = ObjectView::load(self.runtime, address)?;
        let mut out = self.runtime.display_name(view.ty());

        match view.body(self.runtime)? {
            ObjectBody::String(bytes) => {
                out.push(' ');
                out.push_str(&quote_string(bytes));
            }
            ObjectBody::ValueArray { element, count } => {
                let name = self.runtime.display_name(&element);
                let items = vec![name; count];
                out.push_str(&format!(" {{ {} }}", items.join(", ")));
            }
            ObjectBody::ReferenceArray { slots, .. } => {
                let items: Vec<String> = slots.into_iter().map(|slot| self.describe_slot(slot)).collect();
                out.push_str(&format!(" {{ {} }}", items.join(", ")));
            }
            ObjectBody::Plain => {}
        }

        Ok(out)
    }

    /// `Type @ address` for one reference slot.
    fn describe_slot(&self, slot: Address) -> String
    {
        if slot.is_null() {
            return "null".to_string();
        }
        let name = self
            .runtime
            .type_of(slot)
            .map_or_else(|| UNKNOWN_TYPE.to_string(), |ty| self.runtime.display_name(&ty));
        format!("{name} @ {slot}")
    }

    /// List the fields of the object at `address`.
    ///
    /// The first line is the type's display name. Each following line is
    /// `name: <rendering>` for a member group whose first entry is a field.
    ///
    /// Field byte offsets are not part of the metadata, so every line shows
    /// the rendering of the whole object rather than the field's own value.
    ///
    /// ## Errors
    ///
    /// Same as [`render`](Self::render).
    pub fn list_fields(&self, address: Address) -> UldResult<String>
    {
        let view = ObjectView::load(self.runtime, address)?;
        let mut out = self.runtime.display_name(view.ty());
        out.push('\n');

        let fields: Vec<&str> = view.ty().fields().map(|(name, _)| name).collect();
        if fields.is_empty() {
            return Ok(out);
        }

        // Rendered once; every line would produce the same text.
        let rendered = self.render(address)?;
        for name in fields {
            out.push_str(&format!("{name}: {rendered}\n"));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_quote_plain()
    {
        assert_eq!(quote_string(b"abc"), "\"abc\"");
        assert_eq!(quote_string(b""), "\"\"");
    }

    #[test]
    fn test_quote_escapes_every_quote()
    {
        assert_eq!(quote_string(b"\"\""), r#""\"\"""#);
        assert_eq!(quote_string(b"a\"b\"c"), r#""a\"b\"c""#);
    }

    #[test]
    fn test_quote_keeps_raw_bytes()
    {
        assert_eq!(quote_string(b"a\0b"), "\"a\0b\"");
        assert_eq!(quote_string(&[b'x', 0xff]), "\"x\u{fffd}\"");
    }
}
