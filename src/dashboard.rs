//! Dashboard loading with partial-failure tolerance.
//!
//! The five list reads are issued together and settle independently: a
//! failed read becomes an empty list and is named in
//! [`DashboardSnapshot::failed`], while the other reads are still applied.

use crate::client::ApiClient;
use crate::error::{Error, Result};
use crate::feed::{deliver, Feed};
use crate::models::{Customer, Employee, Invoice, ServiceRequest, Vehicle};
use std::collections::HashMap;

const TOP_VEHICLES: usize = 5;
const UNKNOWN_TYPE: &str = "Unknown";

/// Raw lists behind the dashboard.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DashboardSnapshot {
    pub customers: Vec<Customer>,
    pub vehicles: Vec<Vehicle>,
    pub invoices: Vec<Invoice>,
    pub service_requests: Vec<ServiceRequest>,
    pub users: Vec<Employee>,
    /// Collections whose read failed and were replaced by an empty list.
    pub failed: Vec<&'static str>,
}

impl DashboardSnapshot {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Figures derived from a snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DashboardStats {
    pub customers: usize,
    pub vehicles: usize,
    pub invoices: usize,
    pub service_requests: usize,
    pub users: usize,
    /// `(type, count)` by descending count, then type name.
    pub vehicle_types: Vec<(String, usize)>,
    /// First vehicles, in list order, that have an owner name.
    pub top_vehicles: Vec<Vehicle>,
}

impl DashboardStats {
    pub fn from_snapshot(snapshot: &DashboardSnapshot) -> Self {
        let mut by_type: HashMap<&str, usize> = HashMap::new();
        for vehicle in &snapshot.vehicles {
            let name = vehicle
                .vehicle_type
                .as_deref()
                .filter(|t| !t.is_empty())
                .unwrap_or(UNKNOWN_TYPE);
            *by_type.entry(name).or_insert(0) += 1;
        }
        let mut vehicle_types: Vec<(String, usize)> = by_type
            .into_iter()
            .map(|(name, count)| (name.to_string(), count))
            .collect();
        vehicle_types.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let top_vehicles = snapshot
            .vehicles
            .iter()
            .filter(|v| v.customer_name.as_deref().is_some_and(|n| !n.is_empty()))
            .take(TOP_VEHICLES)
            .cloned()
            .collect();

        DashboardStats {
            customers: snapshot.customers.len(),
            vehicles: snapshot.vehicles.len(),
            invoices: snapshot.invoices.len(),
            service_requests: snapshot.service_requests.len(),
            users: snapshot.users.len(),
            vehicle_types,
            top_vehicles,
        }
    }
}

/// Issue all dashboard reads at once and settle each independently.
pub async fn load_dashboard(client: &ApiClient) -> DashboardSnapshot {
    let (customers, vehicles, invoices, service_requests, users) = tokio::join!(
        client.customers().list(),
        client.vehicles().list(),
        client.invoices().list(),
        client.service_requests().list(),
        client.users().list(),
    );

    let mut failed = Vec::new();
    let snapshot = DashboardSnapshot {
        customers: settle("customers", customers, &mut failed),
        vehicles: settle("vehicles", vehicles, &mut failed),
        invoices: settle("invoices", invoices, &mut failed),
        service_requests: settle("service-requests", service_requests, &mut failed),
        users: settle("users", users, &mut failed),
        failed: Vec::new(),
    };
    if !failed.is_empty() {
        warn!("Dashboard loaded with empty defaults for: {}", failed.join(", "));
    }
    DashboardSnapshot { failed, ..snapshot }
}

/// Load the dashboard and hand it to `feed` if the view is still mounted.
pub async fn load_into<F>(client: &ApiClient, feed: &mut F) -> bool
where
    F: Feed<DashboardSnapshot> + ?Sized,
{
    let snapshot = load_dashboard(client).await;
    deliver(feed, Ok(snapshot))
}

fn settle<T>(name: &'static str, result: Result<Vec<T>>, failed: &mut Vec<&'static str>) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) => {
            log_failure(name, &e);
            failed.push(name);
            Vec::new()
        }
    }
}

fn log_failure(name: &str, e: &Error) {
    if e.is_unauthenticated() {
        debug!("Dashboard read {} not authenticated", name);
    } else {
        warn!("Dashboard read {} failed: {}", name, e);
    }
}
