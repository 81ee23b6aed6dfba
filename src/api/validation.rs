use super::ApiError;
use crate::domain::RequirementId;

pub fn validate_requirement_id(id: &str) -> Result<RequirementId, ApiError> {
    match id.trim().parse::<i32>() {
        Ok(value) if value > 0 => Ok(RequirementId::new(value)),
        _ => Err(ApiError::validation(format!(
            "Invalid requirement ID: {}. ID must be a positive integer",
            id
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requirement_id() {
        assert_eq!(
            validate_requirement_id("12").unwrap(),
            RequirementId::new(12)
        );
        assert!(validate_requirement_id("0").is_err());
        assert!(validate_requirement_id("-4").is_err());
        assert!(validate_requirement_id("abc").is_err());
    }
}
