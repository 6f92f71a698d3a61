use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de;

/// Canonical identifier for sequences, cameras, objects and tracks.
///
/// The backend emits ids as JSON numbers in some places and strings in
/// others. Two ids are equal when their stringified forms are equal, so `1`
/// and `"1"` name the same camera. Integer-looking ids sort numerically and
/// before every other id; the rest sort lexically. Serialization writes the
/// JSON kind that was originally received.
#[derive(Clone, Debug)]
pub struct Ident {
    text: String,
    kind: IdentKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum IdentKind {
    Number,
    Text,
}

impl Ident {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn as_integer(&self) -> Option<i64> {
        self.text.parse().ok()
    }

    pub fn is_number(&self) -> bool {
        self.kind == IdentKind::Number
    }

    fn number(text: String) -> Self {
        Self {
            text,
            kind: IdentKind::Number,
        }
    }

    fn sort_key(&self) -> (u8, i64) {
        match self.as_integer() {
            Some(value) => (0, value),
            None => (1, 0),
        }
    }
}

impl PartialEq for Ident {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for Ident {}

impl Hash for Ident {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl Ord for Ident {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then_with(|| self.text.cmp(&other.text))
    }
}

impl PartialOrd for Ident {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for Ident {
    fn from(value: &str) -> Self {
        Self {
            text: value.to_string(),
            kind: IdentKind::Text,
        }
    }
}

impl From<String> for Ident {
    fn from(text: String) -> Self {
        Self {
            text,
            kind: IdentKind::Text,
        }
    }
}

impl From<i64> for Ident {
    fn from(value: i64) -> Self {
        Self::number(value.to_string())
    }
}

impl From<u32> for Ident {
    fn from(value: u32) -> Self {
        Self::number(value.to_string())
    }
}

impl Serialize for Ident {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.kind == IdentKind::Number {
            if let Ok(value) = self.text.parse::<i64>() {
                return serializer.serialize_i64(value);
            }
            if let Ok(value) = self.text.parse::<u64>() {
                return serializer.serialize_u64(value);
            }
            if let Ok(value) = self.text.parse::<f64>() {
                return serializer.serialize_f64(value);
            }
        }
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for Ident {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(IdentVisitor)
    }
}

struct IdentVisitor;

impl de::Visitor<'_> for IdentVisitor {
    type Value = Ident;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or numeric identifier")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Ident, E> {
        Ok(Ident::number(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Ident, E> {
        Ok(Ident::number(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Ident, E> {
        if !v.is_finite() {
            return Err(E::invalid_value(de::Unexpected::Float(v), &self));
        }
        // 3.0 and 3 must name the same id.
        Ok(Ident::number(v.to_string()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Ident, E> {
        Ok(Ident::from(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Ident, E> {
        Ok(Ident::from(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(json: &str) -> Ident {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn numeric_and_string_forms_are_equal() {
        assert_eq!(parse("7"), parse("\"7\""));
        assert_eq!(parse("7.0"), parse("7"));
        assert_ne!(parse("\"07\""), parse("7"));
    }

    #[test]
    fn integers_sort_numerically_before_text() {
        let mut ids = vec![
            Ident::from("10"),
            Ident::from("cam-a"),
            Ident::from(2_i64),
            Ident::from("1a"),
            Ident::from("9"),
        ];
        ids.sort();
        let order: Vec<&str> = ids.iter().map(Ident::as_str).collect();
        assert_eq!(order, vec!["2", "9", "10", "1a", "cam-a"]);
    }

    #[test]
    fn serialization_keeps_the_received_kind() {
        assert_eq!(serde_json::to_string(&parse("12")).unwrap(), "12");
        assert_eq!(serde_json::to_string(&parse("\"12\"")).unwrap(), "\"12\"");
    }

    #[test]
    fn rejects_non_scalar_ids() {
        assert!(serde_json::from_str::<Ident>("[1]").is_err());
        assert!(serde_json::from_str::<Ident>("null").is_err());
    }
}
