//! Resolved tweak values and their display metadata

use std::fmt;

use serde::{Deserialize, Serialize};

/// A typed configuration value.
///
/// Deserializes untagged, so a TOML `true`, `42`, `0.5` or `"text"` maps
/// directly onto the matching variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TweakValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl TweakValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TweakValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            TweakValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Floating-point view; integers are widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            TweakValue::Float(f) => Some(*f),
            TweakValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TweakValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the variant, used in log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            TweakValue::Bool(_) => "bool",
            TweakValue::Int(_) => "int",
            TweakValue::Float(_) => "float",
            TweakValue::String(_) => "string",
        }
    }
}

impl fmt::Display for TweakValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TweakValue::Bool(b) => write!(f, "{}", b),
            TweakValue::Int(i) => write!(f, "{}", i),
            TweakValue::Float(x) => write!(f, "{}", x),
            TweakValue::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for TweakValue {
    fn from(value: bool) -> Self {
        TweakValue::Bool(value)
    }
}

impl From<i64> for TweakValue {
    fn from(value: i64) -> Self {
        TweakValue::Int(value)
    }
}

impl From<i32> for TweakValue {
    fn from(value: i32) -> Self {
        TweakValue::Int(value.into())
    }
}

impl From<f64> for TweakValue {
    fn from(value: f64) -> Self {
        TweakValue::Float(value)
    }
}

impl From<&str> for TweakValue {
    fn from(value: &str) -> Self {
        TweakValue::String(value.to_string())
    }
}

impl From<String> for TweakValue {
    fn from(value: String) -> Self {
        TweakValue::String(value)
    }
}

/// An immutable tweak as returned by a provider or by resolution.
///
/// Every field except the identifier is optional so that providers can
/// supply partial information; the coordinator fills gaps from
/// lower-priority providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tweak {
    identifier: String,
    title: Option<String>,
    group: Option<String>,
    value: Option<TweakValue>,
    can_be_displayed: bool,
}

impl Tweak {
    /// Create a tweak carrying only its identifier.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            title: None,
            group: None,
            value: None,
            can_be_displayed: false,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<TweakValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn displayable(mut self, can_be_displayed: bool) -> Self {
        self.can_be_displayed = can_be_displayed;
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn value(&self) -> Option<&TweakValue> {
        self.value.as_ref()
    }

    pub fn can_be_displayed(&self) -> bool {
        self.can_be_displayed
    }

    /// Fill in fields that `self` lacks from a lower-priority `other`.
    ///
    /// Present fields are never overwritten. Display permission is the
    /// logical OR of both sides.
    pub(crate) fn merged_with(self, other: &Tweak) -> Tweak {
        Tweak {
            identifier: self.identifier,
            title: self.title.or_else(|| other.title.clone()),
            group: self.group.or_else(|| other.group.clone()),
            value: self.value.or_else(|| other.value.clone()),
            can_be_displayed: self.can_be_displayed || other.can_be_displayed,
        }
    }
}

impl fmt::Display for Tweak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier)?;
        match &self.value {
            Some(value) => write!(f, " = {} ({})", value, value.kind())?,
            None => write!(f, " = <unset>")?,
        }
        if let Some(title) = &self.title {
            write!(f, " \"{}\"", title)?;
        }
        if let Some(group) = &self.group {
            write!(f, " [{}]", group)?;
        }
        if self.can_be_displayed {
            write!(f, " displayable")?;
        }
        Ok(())
    }
}

/// Rank of a provider. Higher priorities are consulted first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Priority(pub u16);

impl Priority {
    pub const FALLBACK: Priority = Priority(0);
    pub const LOW: Priority = Priority(3);
    pub const MEDIUM: Priority = Priority(5);
    pub const HIGH: Priority = Priority(8);
    pub const OVERRIDE: Priority = Priority(10);

    pub fn value(self) -> u16 {
        self.0
    }
}

impl From<u16> for Priority {
    fn from(value: u16) -> Self {
        Priority(value)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builder_sets_fields() {
        let tweak = Tweak::new("display_red_view")
            .with_title("Display Red View")
            .with_group("UI Customization")
            .with_value(true)
            .displayable(true);

        assert_eq!(tweak.identifier(), "display_red_view");
        assert_eq!(tweak.title(), Some("Display Red View"));
        assert_eq!(tweak.group(), Some("UI Customization"));
        assert_eq!(tweak.value(), Some(&TweakValue::Bool(true)));
        assert!(tweak.can_be_displayed());
    }

    #[test]
    fn test_merge_keeps_present_fields() {
        let high = Tweak::new("v").with_value(1);
        let low = Tweak::new("v")
            .with_title("T2")
            .with_value(2)
            .displayable(true);

        let merged = high.merged_with(&low);

        assert_eq!(merged.title(), Some("T2"));
        assert_eq!(merged.value(), Some(&TweakValue::Int(1)));
        assert!(merged.can_be_displayed());
    }

    #[test]
    fn test_merge_display_is_or() {
        let merged = Tweak::new("v")
            .displayable(true)
            .merged_with(&Tweak::new("v"));
        assert!(merged.can_be_displayed());

        let merged = Tweak::new("v").merged_with(&Tweak::new("v"));
        assert!(!merged.can_be_displayed());
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(TweakValue::from(true).as_bool(), Some(true));
        assert_eq!(TweakValue::from(42).as_int(), Some(42));
        assert_eq!(TweakValue::from(42).as_float(), Some(42.0));
        assert_eq!(TweakValue::from("hello").as_str(), Some("hello"));
        assert_eq!(TweakValue::from(0.5).as_int(), None);
    }

    #[test]
    fn test_value_deserializes_untagged() {
        let values: Vec<TweakValue> =
            serde_json::from_str(r#"[true, 42, 0.5, "text"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                TweakValue::Bool(true),
                TweakValue::Int(42),
                TweakValue::Float(0.5),
                TweakValue::String("text".to_string()),
            ]
        );
    }

    #[test]
    fn test_display() {
        let tweak = Tweak::new("answer").with_value(42).with_title("Answer");
        assert_eq!(tweak.to_string(), "answer = 42 (int) \"Answer\"");
        assert_eq!(Tweak::new("x").to_string(), "x = <unset>");
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::OVERRIDE > Priority::MEDIUM);
        assert!(Priority::FALLBACK < Priority::LOW);
        assert_eq!(Priority::from(7).to_string(), "p7");
    }
}
