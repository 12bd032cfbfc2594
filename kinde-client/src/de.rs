use serde::{Deserialize, Deserializer};

/// Deserialize a possibly `null` field as `T::default()`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Query pairs for the common `sort`/`page_size`/`next_token` list parameters.
pub(crate) fn list_query(
    sort: Option<&str>,
    page_size: Option<u32>,
    next_token: Option<&str>,
) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(sort) = sort {
        query.push(("sort", sort.to_string()));
    }
    if let Some(page_size) = page_size.filter(|size| *size > 0) {
        query.push(("page_size", page_size.to_string()));
    }
    if let Some(token) = next_token.filter(|token| !token.is_empty()) {
        query.push(("next_token", token.to_string()));
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "null_as_default")]
        items: Vec<u32>,
    }

    #[test]
    fn test_null_and_missing_become_empty() {
        let held: Holder = serde_json::from_str(r#"{"items":null}"#).unwrap();
        assert!(held.items.is_empty());

        let held: Holder = serde_json::from_str("{}").unwrap();
        assert!(held.items.is_empty());

        let held: Holder = serde_json::from_str(r#"{"items":[1,2]}"#).unwrap();
        assert_eq!(held.items, vec![1, 2]);
    }

    #[test]
    fn test_list_query_skips_unset_values() {
        assert!(list_query(None, Some(0), Some("")).is_empty());
        assert_eq!(
            list_query(Some("name_asc"), Some(10), Some("abc")),
            vec![
                ("sort", "name_asc".to_string()),
                ("page_size", "10".to_string()),
                ("next_token", "abc".to_string()),
            ]
        );
    }
}
