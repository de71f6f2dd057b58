use std::borrow::Cow;

use crate::error::Error;

fn character_reference(entity: &str) -> Option<char> {
    let code = if let Some(hex) = entity
        .strip_prefix("#x")
        .or_else(|| entity.strip_prefix("#X"))
    {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        entity.strip_prefix('#')?.parse::<u32>().ok()?
    };
    char::from_u32(code)
}

/// Expand the predefined entities and character references.
///
/// Borrows the input when there is nothing to expand.
pub(crate) fn parse_entities(content: &str) -> Result<Cow<str>, Error> {
    if !content.contains('&') {
        return Ok(Cow::Borrowed(content));
    }
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars();
    while let Some(c) = chars.next() {
        if c != '&' {
            result.push(c);
            continue;
        }
        let mut entity = String::new();
        let mut is_complete = false;
        for c in chars.by_ref() {
            if c == ';' {
                is_complete = true;
                break;
            }
            entity.push(c);
        }
        if !is_complete {
            return Err(Error::UnclosedEntity(entity));
        }
        match entity.as_str() {
            "amp" => result.push('&'),
            "apos" => result.push('\''),
            "gt" => result.push('>'),
            "lt" => result.push('<'),
            "quot" => result.push('"'),
            _ => match character_reference(&entity) {
                Some(c) => result.push(c),
                None => return Err(Error::InvalidEntity(entity)),
            },
        }
    }
    Ok(Cow::Owned(result))
}

fn serialize_entities<'a>(content: &'a str, escape: impl Fn(char) -> Option<&'static str>) -> Cow<'a, str> {
    if !content.chars().any(|c| escape(c).is_some()) {
        return Cow::Borrowed(content);
    }
    let mut result = String::with_capacity(content.len());
    for c in content.chars() {
        match escape(c) {
            Some(entity) => result.push_str(entity),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Escape text content.
pub(crate) fn serialize_text(content: &str) -> Cow<str> {
    serialize_entities(content, |c| match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        _ => None,
    })
}

/// Escape an attribute value for use between double quotes.
pub(crate) fn serialize_attribute(content: &str) -> Cow<str> {
    serialize_entities(content, |c| match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '"' => Some("&quot;"),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(parse_entities("A &amp; B").unwrap(), "A & B");
    }

    #[test]
    fn test_parse_multiple() {
        assert_eq!(
            parse_entities("&amp;&apos;&gt;&lt;&quot;").unwrap(),
            "&'><\""
        );
    }

    #[test]
    fn test_parse_character_references() {
        assert_eq!(parse_entities("&#65;&#x42;&#X43;").unwrap(), "ABC");
    }

    #[test]
    fn test_parse_unknown_entity() {
        let err = parse_entities("&unknown;");
        if let Err(Error::InvalidEntity(entity)) = err {
            assert_eq!(entity, "unknown");
        } else {
            unreachable!();
        }
    }

    #[test]
    fn test_parse_invalid_character_reference() {
        assert!(matches!(
            parse_entities("&#xD800;"),
            Err(Error::InvalidEntity(_))
        ));
    }

    #[test]
    fn test_parse_unfinished_entity() {
        let err = parse_entities("&amp");
        if let Err(Error::UnclosedEntity(entity)) = err {
            assert_eq!(entity, "amp");
        } else {
            unreachable!();
        }
    }

    #[test]
    fn test_parse_no_entities() {
        let text = "hello";
        let result = parse_entities(text).unwrap();
        // this is the same slice
        assert!(std::ptr::eq(text, result.as_ref()));
    }

    #[test]
    fn test_serialize_text() {
        assert_eq!(serialize_text("A & <B> \"q\""), "A &amp; &lt;B&gt; \"q\"");
    }

    #[test]
    fn test_serialize_attribute() {
        assert_eq!(serialize_attribute("A & <B> \"q\""), "A &amp; &lt;B> &quot;q&quot;");
    }

    #[test]
    fn test_serialize_no_entities() {
        let text = "hello";
        let result = serialize_text(text);
        // this is the same slice
        assert!(std::ptr::eq(text, result.as_ref()));
    }
}
