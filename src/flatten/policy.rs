use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Most significant digits an `f64` can carry
pub const MAX_PRECISION: usize = 17;

/// Immutable value formatting policy shared by every row of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlattenPolicy {
    /// Text substituted for missing and null values
    pub null_value: String,

    /// Joins the values of a multi-valued field
    pub separator: String,

    /// Joins the outer level of a list of lists
    pub secondary_separator: String,

    /// Significant digits for non-integral numbers
    pub precision: usize,

    /// Treat zero-length strings as null
    pub zero_as_null: bool,

    /// Treat empty lists as null instead of an empty column
    pub empty_list_as_null: bool,
}

impl Default for FlattenPolicy {
    fn default() -> Self {
        Self {
            null_value: "NA".to_string(),
            separator: "|".to_string(),
            secondary_separator: ";".to_string(),
            precision: 2,
            zero_as_null: false,
            empty_list_as_null: false,
        }
    }
}

impl FlattenPolicy {
    /// Reject combinations that would produce ambiguous output.
    pub fn validate(&self) -> Result<()> {
        if self.separator == self.secondary_separator {
            return Err(ConfigError::InvalidValue {
                field: "export.secondary_separator".to_string(),
                value: self.secondary_separator.clone(),
            }
            .into());
        }
        if self.precision > MAX_PRECISION {
            return Err(ConfigError::InvalidValue {
                field: "export.precision".to_string(),
                value: self.precision.to_string(),
            }
            .into());
        }
        Ok(())
    }
}
