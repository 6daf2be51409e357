use super::Id;
use crate::entity::{Resource, Validate};
use crate::error::Result;
use crate::validation::{require_id, require_text};
use serde::{Deserialize, Serialize};

/// Vehicle with denormalized owner and brand names.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: Id,
    pub number: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(rename = "type", default)]
    pub vehicle_type: Option<String>,
    #[serde(default)]
    pub customer_id: Option<Id>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub brand_id: Option<Id>,
    #[serde(default)]
    pub brand_name: Option<String>,
}

/// Body for `POST /vehicles` and `PUT /vehicles/{id}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInput {
    pub number: String,
    pub model: Option<String>,
    #[serde(rename = "type")]
    pub vehicle_type: Option<String>,
    pub customer_id: Option<Id>,
    pub brand_id: Option<Id>,
}

impl Validate for VehicleInput {
    fn validate(&self) -> Result<()> {
        require_text("Vehicle number", &self.number)?;
        require_id("Customer", self.customer_id)?;
        Ok(())
    }
}

impl Resource for Vehicle {
    type Id = Id;
    type Input = VehicleInput;

    fn id(&self) -> Id {
        self.id
    }

    fn collection() -> &'static str {
        "/vehicles"
    }
}

/// Vehicle manufacturer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandInput {
    pub name: String,
    pub description: Option<String>,
    pub country: Option<String>,
}

impl Validate for BrandInput {
    fn validate(&self) -> Result<()> {
        require_text("Brand name", &self.name)
    }
}

impl Resource for Brand {
    type Id = Id;
    type Input = BrandInput;

    fn id(&self) -> Id {
        self.id
    }

    fn collection() -> &'static str {
        "/brands"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_field_renamed() {
        let input = VehicleInput {
            number: "KA-01-1234".to_string(),
            vehicle_type: Some("Bike".to_string()),
            customer_id: Some(7),
            ..Default::default()
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["type"], "Bike");
        assert_eq!(value["customerId"], 7);
    }

    #[test]
    fn test_vehicle_input_requires_owner() {
        let input = VehicleInput {
            number: "KA-01-1234".to_string(),
            ..Default::default()
        };
        let err = input.validate().unwrap_err();
        assert_eq!(err.user_message(), "Customer is required");
    }
}
