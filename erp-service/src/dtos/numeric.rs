//! Numeric fields arrive as whatever the form held: a string, a JSON number,
//! or nothing. They are carried as text and coerced by
//! [`crate::models::totals::parse_amount`].

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Text(String),
    Int(i64),
    Uint(u64),
    Float(f64),
}

impl RawNumber {
    fn into_text(self) -> String {
        match self {
            RawNumber::Text(s) => s,
            RawNumber::Int(n) => n.to_string(),
            RawNumber::Uint(n) => n.to_string(),
            RawNumber::Float(n) => n.to_string(),
        }
    }
}

/// Accept a string, number or null; null becomes the empty string.
pub fn lenient<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawNumber>::deserialize(deserializer)?
        .map(RawNumber::into_text)
        .unwrap_or_default())
}

/// Like [`lenient`] but keeps null as `None`.
pub fn lenient_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawNumber>::deserialize(deserializer)?.map(RawNumber::into_text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "lenient")]
        rate: String,
        #[serde(default, deserialize_with = "lenient_opt")]
        area: Option<String>,
    }

    #[test]
    fn accepts_strings_numbers_and_null() {
        let p: Probe = serde_json::from_str(r#"{"rate": 12.5, "area": "1,200"}"#).unwrap();
        assert_eq!(p.rate, "12.5");
        assert_eq!(p.area.as_deref(), Some("1,200"));

        let p: Probe = serde_json::from_str(r#"{"rate": null, "area": null}"#).unwrap();
        assert_eq!(p.rate, "");
        assert!(p.area.is_none());

        let p: Probe = serde_json::from_str(r#"{"rate": -4}"#).unwrap();
        assert_eq!(p.rate, "-4");
        assert!(p.area.is_none());
    }
}
