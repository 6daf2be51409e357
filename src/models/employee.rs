use super::{Id, Job};
use crate::entity::{Resource, Validate};
use crate::error::Result;
use crate::validation::{optional_email, require_text};
use serde::{Deserialize, Serialize};

/// Workshop employee (`/users`) with the jobs assigned to them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Id,
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub jobs: Option<Vec<Job>>,
}

impl Employee {
    pub fn jobs(&self) -> &[Job] {
        self.jobs.as_deref().unwrap_or(&[])
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInput {
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Validate for EmployeeInput {
    fn validate(&self) -> Result<()> {
        require_text("Full name", &self.full_name)?;
        optional_email(self.email.as_deref())
    }
}

impl Resource for Employee {
    type Id = Id;
    type Input = EmployeeInput;

    fn id(&self) -> Id {
        self.id
    }

    fn collection() -> &'static str {
        "/users"
    }
}
