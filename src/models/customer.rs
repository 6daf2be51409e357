use super::{Id, Vehicle};
use crate::entity::{Resource, Validate};
use crate::error::Result;
use crate::validation::{optional_email, require_text};
use serde::{Deserialize, Serialize};

/// Customer with their vehicles inline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Id,
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub vehicles: Option<Vec<Vehicle>>,
}

impl Customer {
    pub fn vehicles(&self) -> &[Vehicle] {
        self.vehicles.as_deref().unwrap_or(&[])
    }
}

/// Body for `POST /customers` and `PUT /customers/{id}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Validate for CustomerInput {
    fn validate(&self) -> Result<()> {
        require_text("Full name", &self.full_name)?;
        optional_email(self.email.as_deref())
    }
}

impl Resource for Customer {
    type Id = Id;
    type Input = CustomerInput;

    fn id(&self) -> Id {
        self.id
    }

    fn collection() -> &'static str {
        "/customers"
    }
}
