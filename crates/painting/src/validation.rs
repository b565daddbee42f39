use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum BrushParamError {
    #[error("Invalid brush radius: {0} (must be positive and finite)")]
    InvalidRadius(f32),
    #[error("Invalid brush strength: {0}")]
    InvalidStrength(f32),
    #[error("Invalid brush flow: {0}")]
    InvalidFlow(f32),
    #[error("Invalid brush hardness: {0}")]
    InvalidHardness(f32),
    #[error("Invalid stamp rotation: {0}")]
    InvalidRotation(f32),
}

/// Validate a brush radius. Non-positive and non-finite radii are rejected.
pub fn validate_radius(radius: f32) -> Result<f32, BrushParamError> {
    if radius.is_finite() && radius > 0.0 {
        Ok(radius)
    } else {
        Err(BrushParamError::InvalidRadius(radius))
    }
}

/// Validate a strength value, clamping negatives to zero.
pub fn validate_strength(strength: f32) -> Result<f32, BrushParamError> {
    if strength.is_finite() {
        Ok(strength.max(0.0))
    } else {
        Err(BrushParamError::InvalidStrength(strength))
    }
}

/// Validate a flow value, clamping into 0..1.
pub fn validate_flow(flow: f32) -> Result<f32, BrushParamError> {
    if flow.is_finite() {
        Ok(flow.clamp(0.0, 1.0))
    } else {
        Err(BrushParamError::InvalidFlow(flow))
    }
}

/// Validate a hardness value, clamping into 0..1.
pub fn validate_hardness(hardness: f32) -> Result<f32, BrushParamError> {
    if hardness.is_finite() {
        Ok(hardness.clamp(0.0, 1.0))
    } else {
        Err(BrushParamError::InvalidHardness(hardness))
    }
}

/// Normalize a rotation in degrees into [0, 360).
pub fn normalize_degrees(degrees: f32) -> Result<f32, BrushParamError> {
    if !degrees.is_finite() {
        return Err(BrushParamError::InvalidRotation(degrees));
    }
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    Ok(if wrapped >= 360.0 { 0.0 } else { wrapped })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_rejects_non_positive() {
        assert_eq!(validate_radius(0.5), Ok(0.5));
        assert_eq!(validate_radius(0.0), Err(BrushParamError::InvalidRadius(0.0)));
        assert_eq!(validate_radius(-2.0), Err(BrushParamError::InvalidRadius(-2.0)));
        assert!(validate_radius(f32::NAN).is_err());
        assert!(validate_radius(f32::INFINITY).is_err());
    }

    #[test]
    fn test_clamping_validators() {
        assert_eq!(validate_flow(1.5), Ok(1.0));
        assert_eq!(validate_hardness(-0.5), Ok(0.0));
        assert_eq!(validate_strength(-1.0), Ok(0.0));
        assert!(validate_flow(f32::NAN).is_err());
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(370.0), Ok(10.0));
        assert_eq!(normalize_degrees(-10.0), Ok(350.0));
        assert_eq!(normalize_degrees(360.0), Ok(0.0));
        let tiny = normalize_degrees(-1e-9).unwrap();
        assert!((0.0..360.0).contains(&tiny));
    }
}
