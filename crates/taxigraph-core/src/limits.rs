//! Input validation limits for producer-supplied facts

/// Maximum length for node ids (128 chars)
pub const MAX_NODE_ID_LEN: usize = 128;

/// Maximum length for display names and surface labels (128 chars)
pub const MAX_NAME_LEN: usize = 128;

/// Maximum length for an ICAO airport code
pub const MAX_AIRPORT_CODE_LEN: usize = 4;

/// Maximum taxiways listed at one intersection
pub const MAX_TAXIWAYS_PER_INTERSECTION: usize = 16;

/// Relative distance range for connections
pub const MIN_DISTANCE: u8 = 1;
pub const MAX_DISTANCE: u8 = 10;

/// Largest valid magnetic heading
pub const MAX_HEADING: u16 = 359;

/// Maximum nodes or edges accepted in one import batch
pub const MAX_IMPORT_BATCH: usize = 10_000;

/// Validation error type
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyAirportCode,
    InvalidAirportCode(String),
    EmptyNodeId,
    NodeIdTooLong { len: usize, max: usize },
    EmptyName,
    NameTooLong { len: usize, max: usize },
    DistanceOutOfRange { distance: i64 },
    HeadingOutOfRange { heading: i64 },
    NoTaxiways,
    TooManyTaxiways { count: usize, max: usize },
    BatchTooLarge { count: usize, max: usize },
    NonFinitePosition { axis: &'static str, value: f64 },
}

impl ValidationError {
    /// Name of the offending producer field
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyAirportCode | Self::InvalidAirportCode(_) => "airport",
            Self::EmptyNodeId | Self::NodeIdTooLong { .. } => "id",
            Self::EmptyName | Self::NameTooLong { .. } => "name",
            Self::DistanceOutOfRange { .. } => "distance",
            Self::HeadingOutOfRange { .. } => "heading",
            Self::NoTaxiways | Self::TooManyTaxiways { .. } => "taxiways",
            Self::BatchTooLarge { .. } => "batch",
            Self::NonFinitePosition { axis, .. } => *axis,
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyAirportCode => write!(f, "Airport code cannot be empty"),
            Self::InvalidAirportCode(code) => {
                write!(f, "Airport code must be 1-4 letters or digits: {}", code)
            }
            Self::EmptyNodeId => write!(f, "Node id cannot be empty"),
            Self::NodeIdTooLong { len, max } => {
                write!(f, "Node id too long: {} chars (max {})", len, max)
            }
            Self::EmptyName => write!(f, "Name cannot be empty"),
            Self::NameTooLong { len, max } => {
                write!(f, "Name too long: {} chars (max {})", len, max)
            }
            Self::DistanceOutOfRange { distance } => write!(
                f,
                "Distance {} outside {}-{}",
                distance, MIN_DISTANCE, MAX_DISTANCE
            ),
            Self::HeadingOutOfRange { heading } => {
                write!(f, "Heading {} outside 0-{}", heading, MAX_HEADING)
            }
            Self::NoTaxiways => write!(f, "Taxiway intersection needs at least one taxiway"),
            Self::TooManyTaxiways { count, max } => {
                write!(f, "Too many taxiways: {} (max {})", count, max)
            }
            Self::BatchTooLarge { count, max } => {
                write!(f, "Too many records in batch: {} (max {})", count, max)
            }
            Self::NonFinitePosition { axis, value } => {
                write!(f, "Position {} must be a finite number, got {}", axis, value)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for crate::Error {
    fn from(err: ValidationError) -> Self {
        crate::Error::InvalidField {
            field: err.field(),
            reason: err.to_string(),
        }
    }
}

/// Validate and normalize an airport code to uppercase
pub fn normalize_airport(code: &str) -> Result<String, ValidationError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(ValidationError::EmptyAirportCode);
    }
    if code.len() > MAX_AIRPORT_CODE_LEN || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidAirportCode(code.to_string()));
    }
    Ok(code.to_ascii_uppercase())
}

/// Validate node id
pub fn validate_node_id(id: &str) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        return Err(ValidationError::EmptyNodeId);
    }
    if id.len() > MAX_NODE_ID_LEN {
        return Err(ValidationError::NodeIdTooLong {
            len: id.len(),
            max: MAX_NODE_ID_LEN,
        });
    }
    Ok(())
}

/// Validate a display name or surface label
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong {
            len: name.len(),
            max: MAX_NAME_LEN,
        });
    }
    Ok(())
}

/// Validate connection distance
pub fn validate_distance(distance: i64) -> Result<u8, ValidationError> {
    if distance < i64::from(MIN_DISTANCE) || distance > i64::from(MAX_DISTANCE) {
        return Err(ValidationError::DistanceOutOfRange { distance });
    }
    Ok(distance as u8)
}

/// Validate runway heading
pub fn validate_heading(heading: i64) -> Result<u16, ValidationError> {
    if !(0..=i64::from(MAX_HEADING)).contains(&heading) {
        return Err(ValidationError::HeadingOutOfRange { heading });
    }
    Ok(heading as u16)
}

/// Validate the taxiway list of an intersection
pub fn validate_taxiways(taxiways: &[String]) -> Result<(), ValidationError> {
    if taxiways.is_empty() {
        return Err(ValidationError::NoTaxiways);
    }
    if taxiways.len() > MAX_TAXIWAYS_PER_INTERSECTION {
        return Err(ValidationError::TooManyTaxiways {
            count: taxiways.len(),
            max: MAX_TAXIWAYS_PER_INTERSECTION,
        });
    }
    for taxiway in taxiways {
        validate_name(taxiway)?;
    }
    Ok(())
}

/// Validate a diagram position; NaN and infinities cannot be stored as JSON numbers
pub fn validate_position(x: f64, y: f64) -> Result<(), ValidationError> {
    for (axis, value) in [("x", x), ("y", y)] {
        if !value.is_finite() {
            return Err(ValidationError::NonFinitePosition { axis, value });
        }
    }
    Ok(())
}

/// Validate import batch size
pub fn validate_batch(count: usize) -> Result<(), ValidationError> {
    if count > MAX_IMPORT_BATCH {
        return Err(ValidationError::BatchTooLarge {
            count,
            max: MAX_IMPORT_BATCH,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_airport() {
        assert_eq!(normalize_airport("kdpa").unwrap(), "KDPA");
        assert_eq!(normalize_airport(" KORD ").unwrap(), "KORD");
        assert_eq!(normalize_airport(""), Err(ValidationError::EmptyAirportCode));
        assert!(normalize_airport("K-DPA").is_err());
        assert!(normalize_airport("TOOLONG").is_err());
    }

    #[test]
    fn test_ranges() {
        assert_eq!(validate_distance(1).unwrap(), 1);
        assert_eq!(validate_distance(10).unwrap(), 10);
        assert!(validate_distance(0).is_err());
        assert!(validate_distance(11).is_err());

        assert_eq!(validate_heading(0).unwrap(), 0);
        assert_eq!(validate_heading(359).unwrap(), 359);
        assert!(validate_heading(360).is_err());
        assert!(validate_heading(-10).is_err());
    }

    #[test]
    fn test_validate_taxiways() {
        assert!(validate_taxiways(&["A".to_string()]).is_ok());
        assert_eq!(validate_taxiways(&[]), Err(ValidationError::NoTaxiways));
        assert!(validate_taxiways(&["".to_string()]).is_err());
    }

    #[test]
    fn test_validate_position() {
        assert!(validate_position(0.0, 100.0).is_ok());
        assert!(validate_position(-5.5, 250.0).is_ok());

        let err = validate_position(f64::NAN, 1.0).unwrap_err();
        assert_eq!(err.field(), "x");
        assert_eq!(validate_position(1.0, f64::INFINITY).unwrap_err().field(), "y");
        assert_eq!(
            validate_position(f64::NEG_INFINITY, f64::NAN).unwrap_err().field(),
            "x"
        );
    }

    #[test]
    fn test_into_core_error() {
        let err: crate::Error = ValidationError::DistanceOutOfRange { distance: 42 }.into();
        match err {
            crate::Error::InvalidField { field, .. } => assert_eq!(field, "distance"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
