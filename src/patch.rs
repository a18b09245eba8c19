//! Partial-update helpers.

use serde::{Deserialize, Deserializer};

/// Deserializer for nullable columns in PATCH bodies, where an absent field
/// keeps the stored value but an explicit `null` clears it.
///
/// Use with `#[serde(default, deserialize_with = "patch::double_option")]` on
/// an `Option<Option<T>>` field: absent stays `None`, `null` becomes
/// `Some(None)`, a value becomes `Some(Some(v))`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Body {
        #[serde(default, deserialize_with = "super::double_option")]
        limit: Option<Option<i64>>,
    }

    #[test]
    fn absent_null_and_value_are_distinct() {
        let absent: Body = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.limit, None);

        let cleared: Body = serde_json::from_str(r#"{"limit": null}"#).unwrap();
        assert_eq!(cleared.limit, Some(None));

        let set: Body = serde_json::from_str(r#"{"limit": 9}"#).unwrap();
        assert_eq!(set.limit, Some(Some(9)));
    }
}
