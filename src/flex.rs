use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A value that may arrive as a number, a numeric string, or null.
/// Model output and GRID ids are both inconsistent about this.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FlexValue {
    Number(f64),
    Text(String),
    #[default]
    Null,
}

impl FlexValue {
    /// Get as f64, parsing text like "1.42" or "65%"
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FlexValue::Number(n) => Some(*n),
            FlexValue::Text(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
            FlexValue::Null => None,
        }
    }

    /// Get as string (integral numbers print without a fraction)
    pub fn to_string_value(&self) -> Option<String> {
        match self {
            FlexValue::Number(n) if n.fract() == 0.0 => Some(format!("{}", *n as i64)),
            FlexValue::Number(n) => Some(n.to_string()),
            FlexValue::Text(s) => Some(s.clone()),
            FlexValue::Null => None,
        }
    }
}

impl fmt::Display for FlexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_string_value() {
            Some(s) => write!(f, "{}", s),
            None => write!(f, "null"),
        }
    }
}

impl Serialize for FlexValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            FlexValue::Number(n) => serializer.serialize_f64(*n),
            FlexValue::Text(s) => serializer.serialize_str(s),
            FlexValue::Null => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for FlexValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct FlexVisitor;

        impl<'de> Visitor<'de> for FlexVisitor {
            type Value = FlexValue;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a number, string, or null")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(FlexValue::Number(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(FlexValue::Number(v as f64))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(FlexValue::Number(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(FlexValue::Text(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(FlexValue::Text(v))
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(FlexValue::Null)
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(FlexValue::Null)
            }
        }

        deserializer.deserialize_any(FlexVisitor)
    }
}

/// Number or numeric string; rejects non-numeric text, null becomes 0
pub fn deserialize_flex_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let flex = FlexValue::deserialize(deserializer)?;
    match flex {
        FlexValue::Null => Ok(0.0),
        other => other
            .as_f64()
            .ok_or_else(|| D::Error::custom(format!("expected a number, got '{}'", other))),
    }
}

/// Like `deserialize_flex_f64` but rounds into a u32, clamping negatives to 0
pub fn deserialize_flex_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = deserialize_flex_f64(deserializer)?;
    Ok(value.max(0.0).round() as u32)
}

/// Ids come back as strings or integers depending on the endpoint
pub fn deserialize_flex_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    FlexValue::deserialize(deserializer)?
        .to_string_value()
        .ok_or_else(|| D::Error::custom("id must not be null"))
}
