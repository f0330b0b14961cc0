//! Typed wrappers for the `/sales` endpoints, the app's main authorized
//! workload once a session exists.

use reqwest::Method;

use super::types::{MessageResponse, SalesByDate, SalesRecord};
use super::ApiGateway;
use crate::error::{Error, Result};

impl ApiGateway {
    /// `POST /sales/save`. Runs the same checks the app applies before
    /// submitting, so a bad record never reaches the network.
    pub async fn save_sales(&self, record: &SalesRecord) -> Result<String> {
        validate_sales_record(record)?;
        let response: MessageResponse = self
            .send(self.request(Method::POST, "/sales/save").json(record))
            .await?;
        Ok(response.message)
    }

    /// `GET /sales/agent?agent_id=`: every record for one agent.
    pub async fn fetch_sales(&self, agent_id: &str) -> Result<Vec<SalesRecord>> {
        self.send(
            self.request(Method::GET, "/sales/agent")
                .query(&[("agent_id", agent_id)]),
        )
        .await
    }

    /// `GET /sales/by-date-agent?agent_id=`: per-date aggregates for the
    /// sales charts.
    pub async fn fetch_sales_by_date(&self, agent_id: &str) -> Result<Vec<SalesByDate>> {
        self.send(
            self.request(Method::GET, "/sales/by-date-agent")
                .query(&[("agent_id", agent_id)]),
        )
        .await
    }
}

fn validate_sales_record(record: &SalesRecord) -> Result<()> {
    if record.agent_id.trim().is_empty() {
        return Err(Error::validation("Agent ID not found. Please log in again."));
    }
    if record.province.trim().is_empty()
        || record.district.trim().is_empty()
        || record.area.trim().is_empty()
    {
        return Err(Error::validation(
            "Province, District, and Area cannot be empty",
        ));
    }
    if record.dlb_sale < 0 || record.nlb_sale < 0 {
        return Err(Error::validation(
            "DLB Sales and NLB Sales must be non-negative integers",
        ));
    }
    if record.total_sale != record.dlb_sale + record.nlb_sale {
        return Err(Error::validation(
            "Total Sales must equal DLB Sales plus NLB Sales",
        ));
    }
    if record.total_sale <= 0 {
        return Err(Error::validation("Total Sales must be greater than zero"));
    }
    Ok(())
}
