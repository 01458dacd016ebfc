// One-off payment gate backed by GoCardless billing-request flows.
//
// The hosted flow redirects back to `/payment_success`; that redirect is
// trusted as-is and the billing request status is not re-checked here.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::config::{AppConfig, ConfigError};

const GOCARDLESS_VERSION: &str = "2015-07-06";
const PAYMENT_DESCRIPTION: &str = "Buttercup personalised playlist";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Price {
    /// Minor currency units (pence, cents)
    pub amount: u32,
    pub currency: &'static str,
    pub display: &'static str,
}

const DEFAULT_PRICE: Price = Price {
    amount: 299,
    currency: "GBP",
    display: "£2.99",
};

const EURO_PRICE: Price = Price {
    amount: 100,
    currency: "EUR",
    display: "€1",
};

/// Price for an ISO country code; unknown or missing codes get the GBP price.
pub fn price_for_country(country: Option<&str>) -> Price {
    let code = country.unwrap_or_default().trim().to_ascii_uppercase();
    match code.as_str() {
        "US" => Price {
            amount: 100,
            currency: "USD",
            display: "$1",
        },
        "CA" => Price {
            amount: 150,
            currency: "CAD",
            display: "CA$1.50",
        },
        "AU" => Price {
            amount: 150,
            currency: "AUD",
            display: "A$1.50",
        },
        "IE" | "DE" | "FR" | "ES" | "IT" | "NL" => EURO_PRICE,
        _ => DEFAULT_PRICE,
    }
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("payment provider returned {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("unexpected payment provider response")]
    MalformedResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentSession {
    pub flow_id: String,
    pub redirect_url: String,
}

#[derive(Deserialize)]
struct BillingRequestEnvelope {
    billing_requests: Resource,
}

#[derive(Deserialize)]
struct FlowEnvelope {
    billing_request_flows: Flow,
}

#[derive(Deserialize)]
struct Resource {
    id: String,
}

#[derive(Deserialize)]
struct Flow {
    id: String,
    authorisation_url: String,
}

pub struct PaymentGateway {
    client: Client,
    access_token: String,
    base_url: String,
    public_base_url: String,
}

impl PaymentGateway {
    pub fn from_config(client: Client, config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            client,
            access_token: config.billing.access_token()?.to_string(),
            base_url: config.billing.base_url().to_string(),
            public_base_url: config.public_base_url.clone(),
        })
    }

    /// Create a billing request for `price` and start a hosted flow for it.
    pub async fn create_session(&self, price: &Price) -> Result<PaymentSession, PaymentError> {
        let request: BillingRequestEnvelope = self
            .post(
                "billing_requests",
                json!({
                    "billing_requests": {
                        "payment_request": {
                            "description": PAYMENT_DESCRIPTION,
                            "amount": price.amount,
                            "currency": price.currency
                        }
                    }
                }),
            )
            .await?;

        let flow: FlowEnvelope = self
            .post(
                "billing_request_flows",
                json!({
                    "billing_request_flows": {
                        "redirect_uri": format!("{}/payment_success", self.public_base_url),
                        "exit_uri": format!("{}/", self.public_base_url),
                        "links": { "billing_request": request.billing_requests.id }
                    }
                }),
            )
            .await?;

        Ok(PaymentSession {
            flow_id: flow.billing_request_flows.id,
            redirect_url: flow.billing_request_flows.authorisation_url,
        })
    }

    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        resource: &str,
        body: serde_json::Value,
    ) -> Result<T, PaymentError> {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, resource))
            .bearer_auth(&self.access_token)
            .header("GoCardless-Version", GOCARDLESS_VERSION)
            .header("Idempotency-Key", Uuid::new_v4().to_string())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
                .unwrap_or_else(|| "Unknown error occurred".to_string());
            return Err(PaymentError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|_| PaymentError::MalformedResponse)
    }
}
