use super::matches_query;
use crate::error::{Error, Result};
use crate::models::{
    Id, Job, JobInput, ServiceRequest, ServiceRequestInput, ServiceRequestStatus,
    ServiceTemplate, Vehicle,
};
use crate::repository::ServiceRequestRepository;
use crate::validation::non_negative_amount;

const SAVE_FAILED: &str = "Failed to save service request";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceRequestStep {
    SelectingVehicle,
    SelectingTemplates,
    Saved,
}

/// A template picked for the new request, with its (possibly overridden)
/// cost.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectedTemplate {
    pub template: ServiceTemplate,
    pub cost: f64,
}

/// Service-request creation wizard: pick a vehicle, pick templates, save a
/// COMPLETED request with one job per template.
///
/// A save that fails halfway keeps what was already created. Saving again
/// reuses the created request and only creates the missing jobs.
#[derive(Clone, Debug)]
pub struct ServiceRequestWizard {
    step: ServiceRequestStep,
    vehicle: Option<Vehicle>,
    templates: Vec<SelectedTemplate>,
    pub description: String,
    error: Option<String>,
    created: Option<ServiceRequest>,
    created_jobs: Vec<Job>,
}

impl Default for ServiceRequestWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceRequestWizard {
    pub fn new() -> Self {
        ServiceRequestWizard {
            step: ServiceRequestStep::SelectingVehicle,
            vehicle: None,
            templates: Vec::new(),
            description: String::new(),
            error: None,
            created: None,
            created_jobs: Vec::new(),
        }
    }

    /// Vehicles matching `query` on number, customer name or model.
    pub fn vehicle_options<'a>(vehicles: &'a [Vehicle], query: &str) -> Vec<&'a Vehicle> {
        vehicles
            .iter()
            .filter(|v| {
                matches_query(
                    query,
                    [
                        Some(v.number.as_str()),
                        v.customer_name.as_deref(),
                        v.model.as_deref(),
                    ],
                )
            })
            .collect()
    }

    /// Active templates matching `query` on name or description.
    pub fn template_options<'a>(
        templates: &'a [ServiceTemplate],
        query: &str,
    ) -> Vec<&'a ServiceTemplate> {
        templates
            .iter()
            .filter(|t| t.active)
            .filter(|t| matches_query(query, [Some(t.name.as_str()), t.description.as_deref()]))
            .collect()
    }

    pub fn step(&self) -> ServiceRequestStep {
        self.step
    }

    pub fn vehicle(&self) -> Option<&Vehicle> {
        self.vehicle.as_ref()
    }

    pub fn selected_templates(&self) -> &[SelectedTemplate] {
        &self.templates
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The created request, once saved (or partially saved).
    pub fn created(&self) -> Option<&ServiceRequest> {
        self.created.as_ref()
    }

    pub fn created_jobs(&self) -> &[Job] {
        &self.created_jobs
    }

    pub fn select_vehicle(&mut self, vehicle: Vehicle) -> Result<()> {
        self.error = None;
        self.expect_step(ServiceRequestStep::SelectingVehicle, "select_vehicle")?;
        self.vehicle = Some(vehicle);
        Ok(())
    }

    pub fn next(&mut self) -> Result<()> {
        self.error = None;
        self.expect_step(ServiceRequestStep::SelectingVehicle, "next")?;
        if self.vehicle.is_none() {
            return self.fail(Error::ValidationError("Please select a vehicle".to_string()));
        }
        self.step = ServiceRequestStep::SelectingTemplates;
        Ok(())
    }

    pub fn back(&mut self) -> Result<()> {
        self.error = None;
        self.expect_step(ServiceRequestStep::SelectingTemplates, "back")?;
        if self.created.is_some() {
            return self.fail(Error::InvalidTransition(
                "the service request has already been created".to_string(),
            ));
        }
        self.step = ServiceRequestStep::SelectingVehicle;
        Ok(())
    }

    /// Add `template` at its default cost, or remove it if already selected.
    /// Inactive templates cannot be added, and a template whose job was
    /// already created by an earlier partial save cannot be removed.
    pub fn toggle_template(&mut self, template: &ServiceTemplate) -> Result<()> {
        self.error = None;
        self.expect_step(ServiceRequestStep::SelectingTemplates, "toggle_template")?;
        if let Some(pos) = self.templates.iter().position(|s| s.template.id == template.id) {
            if self.job_created_for(template.id) {
                let err = self.already_created(&template.name);
                return self.fail(err);
            }
            self.templates.remove(pos);
            return Ok(());
        }
        if !template.active {
            return self.fail(Error::ValidationError(format!(
                "Service template '{}' is inactive",
                template.name
            )));
        }
        self.templates.push(SelectedTemplate {
            template: template.clone(),
            cost: template.default_cost,
        });
        Ok(())
    }

    /// Override the cost of a selected template.
    pub fn set_cost(&mut self, template_id: Id, cost: f64) -> Result<()> {
        self.error = None;
        if let Err(e) = non_negative_amount("Cost", cost) {
            return self.fail(e);
        }
        if self.job_created_for(template_id) {
            let name = self
                .templates
                .iter()
                .find(|s| s.template.id == template_id)
                .map(|s| s.template.name.clone())
                .unwrap_or_default();
            let err = self.already_created(&name);
            return self.fail(err);
        }
        match self.templates.iter_mut().find(|s| s.template.id == template_id) {
            Some(selected) => {
                selected.cost = cost;
                Ok(())
            }
            None => self.fail(Error::ValidationError(format!(
                "Service template {} is not selected",
                template_id
            ))),
        }
    }

    /// Sum of the selected costs.
    pub fn total(&self) -> f64 {
        self.templates.iter().fold(0.0, |sum, s| sum + s.cost)
    }

    /// Create the request and its jobs.
    pub async fn save<R: ServiceRequestRepository>(&mut self, repo: &R) -> Result<&ServiceRequest> {
        self.error = None;
        self.expect_step(ServiceRequestStep::SelectingTemplates, "save")?;
        if self.templates.is_empty() {
            return self.fail(Error::ValidationError(
                "Please select at least one service template".to_string(),
            ));
        }

        let request_id = match self.created.as_ref().map(|r| r.id) {
            Some(id) => id,
            None => {
                let input = ServiceRequestInput {
                    description: self.description.clone(),
                    status: ServiceRequestStatus::Completed,
                    vehicle_id: self.vehicle.as_ref().map(|v| v.id),
                };
                match repo.create_service_request(&input).await {
                    Ok(request) => {
                        let id = request.id;
                        self.created = Some(request);
                        id
                    }
                    Err(e) => return self.fail(e),
                }
            }
        };

        let pending: Vec<SelectedTemplate> = self
            .templates
            .iter()
            .filter(|s| !self.job_created_for(s.template.id))
            .cloned()
            .collect();
        for selected in pending {
            let input = JobInput {
                description: selected.template.description.clone(),
                job_name: selected.template.name.clone(),
                cost: selected.cost,
                service_request_id: Some(request_id),
                user_id: None,
                service_template_id: Some(selected.template.id),
            };
            match repo.create_job(&input).await {
                Ok(job) => self.created_jobs.push(job),
                Err(e) => {
                    warn!(
                        "Job '{}' for service request {} failed: {}",
                        input.job_name, request_id, e
                    );
                    return self.fail(e);
                }
            }
        }

        info!(
            "Created service request {} with {} jobs",
            request_id,
            self.created_jobs.len()
        );
        self.step = ServiceRequestStep::Saved;
        match &self.created {
            Some(request) => Ok(request),
            None => Err(Error::Other("service request missing after save".to_string())),
        }
    }

    fn job_created_for(&self, template_id: Id) -> bool {
        self.created_jobs
            .iter()
            .any(|j| j.service_template_id == Some(template_id))
    }

    fn already_created(&self, template_name: &str) -> Error {
        Error::InvalidTransition(format!(
            "'{}' is already a job on service request #{}",
            template_name,
            self.created.as_ref().map(|r| r.id).unwrap_or_default()
        ))
    }

    fn expect_step(&mut self, expected: ServiceRequestStep, op: &str) -> Result<()> {
        if self.step == expected {
            return Ok(());
        }
        let err = Error::InvalidTransition(format!("{} is not allowed in {:?}", op, self.step));
        self.error = Some(err.to_string());
        Err(err)
    }

    fn fail<T>(&mut self, err: Error) -> Result<T> {
        self.error = Some(err.message_or(SAVE_FAILED));
        Err(err)
    }
}
