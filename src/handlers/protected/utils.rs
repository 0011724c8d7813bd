use std::collections::HashMap;

use axum::{extract::rejection::JsonRejection, Json};

use crate::error::ApiError;

/// Parse a path or query identifier
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::validation_error(format!("invalid id: {raw}")))
}

/// Optional id from a query string, looked up under each accepted spelling.
/// Absent, empty or `null` means "no id".
pub fn optional_query_id(params: &HashMap<String, String>, names: &[&str]) -> Result<Option<i64>, ApiError> {
    let raw = names.iter().find_map(|name| params.get(*name));
    match raw.map(|s| s.trim()) {
        None | Some("") | Some("null") => Ok(None),
        Some(value) => parse_id(value).map(Some),
    }
}

/// Unwrap a JSON body, turning axum's rejection into an API error
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(ApiError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn parses_ids_and_rejects_garbage() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(matches!(parse_id("abc"), Err(ApiError::ValidationError(_))));
    }

    #[test]
    fn query_id_accepts_both_spellings() {
        let names = ["parent_id", "parentId"];
        assert_eq!(optional_query_id(&params(&[("parent_id", "3")]), &names).unwrap(), Some(3));
        assert_eq!(optional_query_id(&params(&[("parentId", "4")]), &names).unwrap(), Some(4));
        assert_eq!(optional_query_id(&params(&[]), &names).unwrap(), None);
        assert_eq!(optional_query_id(&params(&[("parentId", "null")]), &names).unwrap(), None);
        assert!(optional_query_id(&params(&[("parentId", "x")]), &names).is_err());
    }
}
