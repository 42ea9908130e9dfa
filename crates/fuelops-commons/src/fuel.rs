use serde::Deserialize;
use serde::Serialize;
use std::fmt;

/// A fuel type.
///
/// Deliberately an open string set: stations add new products (CNG, EV
/// charging tiers) without a schema change, so this must not be a closed
/// enum at the column level or on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FuelType(String);

impl FuelType {
    pub const PETROL: &'static str = "petrol";
    pub const DIESEL: &'static str = "diesel";
    pub const PREMIUM_PETROL: &'static str = "premium_petrol";
    pub const PREMIUM_DIESEL: &'static str = "premium_diesel";
    pub const CNG: &'static str = "cng";
    pub const LPG: &'static str = "lpg";
    pub const EV_CHARGING: &'static str = "ev_charging";

    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().to_lowercase())
    }

    pub fn petrol() -> Self {
        Self(Self::PETROL.to_string())
    }

    pub fn diesel() -> Self {
        Self(Self::DIESEL.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Default mapping for auto-created nozzles: 1-2 petrol, 3-4 diesel.
    pub fn default_for_nozzle(nozzle_number: i32) -> Self {
        if nozzle_number <= 2 {
            Self::petrol()
        } else {
            Self::diesel()
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for FuelType {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for FuelType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nozzle_number_maps_to_default_fuel() {
        assert_eq!(FuelType::default_for_nozzle(1), FuelType::petrol());
        assert_eq!(FuelType::default_for_nozzle(2), FuelType::petrol());
        assert_eq!(FuelType::default_for_nozzle(3), FuelType::diesel());
        assert_eq!(FuelType::default_for_nozzle(4), FuelType::diesel());
    }

    #[test]
    fn fuel_type_is_case_insensitive() {
        assert_eq!(FuelType::new("Petrol"), FuelType::petrol());
    }
}
