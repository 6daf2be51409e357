use super::Id;
use crate::entity::{Resource, Validate};
use crate::error::Result;
use crate::validation::{non_negative_amount, require_id, require_text};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a service request. Only `Completed` requests can be invoiced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceRequestStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl ServiceRequestStatus {
    /// Wire representation, e.g. `IN_PROGRESS`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceRequestStatus::Pending => "PENDING",
            ServiceRequestStatus::InProgress => "IN_PROGRESS",
            ServiceRequestStatus::Completed => "COMPLETED",
            ServiceRequestStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for ServiceRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of work on a vehicle, with its jobs in order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    pub id: Id,
    #[serde(default)]
    pub description: String,
    pub status: ServiceRequestStatus,
    #[serde(default)]
    pub vehicle_id: Option<Id>,
    #[serde(default)]
    pub vehicle_number: Option<String>,
    #[serde(default)]
    pub customer_id: Option<Id>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub jobs: Option<Vec<Job>>,
}

impl ServiceRequest {
    pub fn jobs(&self) -> &[Job] {
        self.jobs.as_deref().unwrap_or(&[])
    }

    /// Costs of every job, in job order.
    pub fn job_costs(&self) -> Vec<f64> {
        self.jobs().iter().map(|job| job.cost).collect()
    }

    pub fn is_completed(&self) -> bool {
        self.status == ServiceRequestStatus::Completed
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequestInput {
    pub description: String,
    pub status: ServiceRequestStatus,
    pub vehicle_id: Option<Id>,
}

impl Validate for ServiceRequestInput {
    fn validate(&self) -> Result<()> {
        require_id("Vehicle", self.vehicle_id)?;
        Ok(())
    }
}

impl Resource for ServiceRequest {
    type Id = Id;
    type Input = ServiceRequestInput;

    fn id(&self) -> Id {
        self.id
    }

    fn collection() -> &'static str {
        "/service-requests"
    }
}

/// A job (`/services`): one priced line of work inside a service request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Id,
    #[serde(default)]
    pub description: Option<String>,
    pub job_name: String,
    pub cost: f64,
    #[serde(default)]
    pub service_request_id: Option<Id>,
    #[serde(default)]
    pub user_id: Option<Id>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub service_template_id: Option<Id>,
    #[serde(default)]
    pub service_template_name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInput {
    pub description: Option<String>,
    pub job_name: String,
    pub cost: f64,
    pub service_request_id: Option<Id>,
    pub user_id: Option<Id>,
    pub service_template_id: Option<Id>,
}

impl Validate for JobInput {
    fn validate(&self) -> Result<()> {
        require_text("Job name", &self.job_name)?;
        non_negative_amount("Cost", self.cost)?;
        require_id("Service request", self.service_request_id)?;
        Ok(())
    }
}

impl Resource for Job {
    type Id = Id;
    type Input = JobInput;

    fn id(&self) -> Id {
        self.id
    }

    fn collection() -> &'static str {
        "/services"
    }
}

/// Master data used to compose jobs. Inactive templates stay attached to
/// historical jobs but are no longer offered for new requests.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTemplate {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub default_cost: f64,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTemplateInput {
    pub name: String,
    pub description: Option<String>,
    pub default_cost: f64,
    pub active: bool,
}

impl Default for ServiceTemplateInput {
    fn default() -> Self {
        ServiceTemplateInput {
            name: String::new(),
            description: None,
            default_cost: 0.0,
            active: true,
        }
    }
}

impl Validate for ServiceTemplateInput {
    fn validate(&self) -> Result<()> {
        require_text("Template name", &self.name)?;
        non_negative_amount("Default cost", self.default_cost)
    }
}

impl Resource for ServiceTemplate {
    type Id = Id;
    type Input = ServiceTemplateInput;

    fn id(&self) -> Id {
        self.id
    }

    fn collection() -> &'static str {
        "/service-templates"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        let status: ServiceRequestStatus = serde_json::from_str("\"IN_PROGRESS\"").unwrap();
        assert_eq!(status, ServiceRequestStatus::InProgress);
        assert_eq!(
            serde_json::to_string(&ServiceRequestStatus::Completed).unwrap(),
            "\"COMPLETED\""
        );
        assert_eq!(ServiceRequestStatus::Cancelled.to_string(), "CANCELLED");
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!(serde_json::from_str::<ServiceRequestStatus>("\"ARCHIVED\"").is_err());
    }

    #[test]
    fn test_job_costs_in_order() {
        let json = r#"{
            "id": 12, "description": "Full service", "status": "COMPLETED",
            "vehicleId": 3, "vehicleNumber": "KA-01-1234",
            "customerId": 7, "customerName": "Asha Rao",
            "jobs": [
                {"id": 1, "jobName": "Oil change", "cost": 500.0},
                {"id": 2, "jobName": "Brake pads", "cost": 1200.5, "description": "Front"}
            ]
        }"#;
        let request: ServiceRequest = serde_json::from_str(json).unwrap();
        assert!(request.is_completed());
        assert_eq!(request.job_costs(), vec![500.0, 1200.5]);
    }

    #[test]
    fn test_template_active_defaults_true() {
        let json = r#"{"id": 4, "name": "Oil change", "defaultCost": 500.0}"#;
        let template: ServiceTemplate = serde_json::from_str(json).unwrap();
        assert!(template.active);
        assert!(ServiceTemplateInput::default().active);
    }

    #[test]
    fn test_job_input_rejects_negative_cost() {
        let input = JobInput {
            job_name: "Wash".to_string(),
            cost: -1.0,
            service_request_id: Some(12),
            ..Default::default()
        };
        assert_eq!(input.validate().unwrap_err().user_message(), "Cost cannot be negative");
    }
}
