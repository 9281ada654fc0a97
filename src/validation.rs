//! Small input helpers shared by the resource handlers

use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// Trim an optional text field, treating blank as absent
pub fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trimmed, non-empty text or a 400 naming the field
pub fn required(value: String, field: &str) -> ApiResult<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(ApiError::validation(format!("{} is required", field)));
    }
    Ok(value)
}

pub fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::validation("Invalid ID format"))
}

/// For partial updates: an absent field stays `None` (via `#[serde(default)]`),
/// an explicit `null` becomes `Some(None)`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_optional() {
        assert_eq!(clean_optional(None), None);
        assert_eq!(clean_optional(Some("   ".to_string())), None);
        assert_eq!(
            clean_optional(Some(" Engineering ".to_string())),
            Some("Engineering".to_string())
        );
    }

    #[test]
    fn test_required() {
        assert_eq!(required(" Ada ".to_string(), "Name").unwrap(), "Ada");
        let err = required("  ".to_string(), "Name").unwrap_err();
        assert_eq!(err.to_string(), "Name is required");
    }

    #[test]
    fn test_parse_id() {
        assert!(parse_id("not-a-uuid").is_err());
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
    }
}
