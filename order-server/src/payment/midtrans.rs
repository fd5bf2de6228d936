//! Midtrans Snap integration via REST API (no SDK dependency)

use super::{
    GatewayError, GatewayNotification, PaymentGateway, PaymentToken, TransactionDescriptor,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use sha2::{Digest, Sha512};
use subtle::ConstantTimeEq;
use std::time::Duration;

const SNAP_SANDBOX: &str = "https://app.sandbox.midtrans.com";
const SNAP_PRODUCTION: &str = "https://app.midtrans.com";
const API_SANDBOX: &str = "https://api.sandbox.midtrans.com";
const API_PRODUCTION: &str = "https://api.midtrans.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Midtrans Snap client
///
/// Token requests use HTTP basic auth with the server key as username.
/// Notifications are authenticated by their `signature_key` and, when
/// `verify_status` is on, by re-reading the transaction from the status API.
pub struct MidtransGateway {
    client: reqwest::Client,
    server_key: String,
    snap_base: String,
    api_base: String,
    verify_status: bool,
}

#[derive(Debug, Deserialize)]
struct SnapResponse {
    token: Option<String>,
    redirect_url: Option<String>,
    #[serde(default)]
    error_messages: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    order_id: Option<String>,
    transaction_status: Option<String>,
    fraud_status: Option<String>,
    status_code: Option<String>,
    status_message: Option<String>,
}

impl MidtransGateway {
    pub fn new(
        server_key: impl Into<String>,
        is_production: bool,
        verify_status: bool,
    ) -> Result<Self, GatewayError> {
        let (snap_base, api_base) = if is_production {
            (SNAP_PRODUCTION, API_PRODUCTION)
        } else {
            (SNAP_SANDBOX, API_SANDBOX)
        };
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            server_key: server_key.into(),
            snap_base: snap_base.to_string(),
            api_base: api_base.to_string(),
            verify_status,
        })
    }

    /// Point the client at other hosts (e.g. a local stub)
    pub fn with_endpoints(mut self, snap_base: impl Into<String>, api_base: impl Into<String>) -> Self {
        self.snap_base = snap_base.into().trim_end_matches('/').to_string();
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Check `signature_key` against SHA-512(order_id + status_code + gross_amount + server_key)
    pub fn verify_signature(
        &self,
        order_id: &str,
        status_code: &str,
        gross_amount: &str,
        signature_key: &str,
    ) -> Result<(), GatewayError> {
        let mut hasher = Sha512::new();
        hasher.update(order_id.as_bytes());
        hasher.update(status_code.as_bytes());
        hasher.update(gross_amount.as_bytes());
        hasher.update(self.server_key.as_bytes());
        let expected = hasher.finalize();

        let provided = hex::decode(signature_key.trim()).map_err(|_| GatewayError::InvalidSignature)?;
        if bool::from(expected.as_slice().ct_eq(&provided)) {
            Ok(())
        } else {
            Err(GatewayError::InvalidSignature)
        }
    }

    async fn fetch_status(&self, order_id: &str) -> Result<StatusResponse, GatewayError> {
        let url = format!("{}/v2/{}/status", self.api_base, order_id);
        let resp = self
            .client
            .get(&url)
            .basic_auth(&self.server_key, None::<&str>)
            .header("Accept", "application/json")
            .send()
            .await?;

        let http_status = resp.status();
        if !http_status.is_success() {
            return Err(GatewayError::Rejected {
                status: http_status.as_u16(),
                message: resp.text().await.unwrap_or_default(),
            });
        }
        let status: StatusResponse = resp.json().await?;

        // The status API answers 200 with its own status_code for unknown transactions
        if let Some(code) = status.status_code.as_deref()
            && !code.starts_with('2')
        {
            return Err(GatewayError::Rejected {
                status: code.parse().unwrap_or(0),
                message: status.status_message.clone().unwrap_or_default(),
            });
        }
        Ok(status)
    }
}

#[async_trait]
impl PaymentGateway for MidtransGateway {
    async fn request_token(
        &self,
        descriptor: &TransactionDescriptor,
    ) -> Result<PaymentToken, GatewayError> {
        let body = json!({
            "transaction_details": {
                "order_id": descriptor.external_ref,
                "gross_amount": descriptor.gross_amount,
            },
            "item_details": descriptor.items,
            "customer_details": {
                "first_name": descriptor.customer_name,
            },
        });

        let resp = self
            .client
            .post(format!("{}/snap/v1/transactions", self.snap_base))
            .basic_auth(&self.server_key, None::<&str>)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await?;

        let http_status = resp.status();
        let snap: SnapResponse = resp.json().await?;

        match snap.token {
            Some(token) if http_status.is_success() => Ok(PaymentToken {
                token,
                redirect_url: snap.redirect_url,
            }),
            _ => Err(GatewayError::Rejected {
                status: http_status.as_u16(),
                message: snap.error_messages.join("; "),
            }),
        }
    }

    async fn verify_notification(&self, payload: &Value) -> Result<GatewayNotification, GatewayError> {
        let order_id = required_str(payload, "order_id")?;
        let status_code = required_str(payload, "status_code")?;
        let gross_amount = required_str(payload, "gross_amount")?;
        let signature_key = required_str(payload, "signature_key")?;

        self.verify_signature(&order_id, &status_code, &gross_amount, &signature_key)?;

        if !self.verify_status {
            return Ok(GatewayNotification {
                transaction_status: required_str(payload, "transaction_status")?,
                fraud_status: optional_str(payload, "fraud_status"),
                external_ref: order_id,
            });
        }

        let status = self.fetch_status(&order_id).await?;
        if status.order_id.as_deref().is_some_and(|id| id != order_id) {
            return Err(GatewayError::InvalidPayload(format!(
                "status API answered for a different order than {order_id}"
            )));
        }
        let transaction_status = status.transaction_status.ok_or_else(|| {
            GatewayError::InvalidPayload("status API response lacks transaction_status".into())
        })?;

        Ok(GatewayNotification {
            external_ref: order_id,
            transaction_status,
            fraud_status: status.fraud_status,
        })
    }
}

/// Gateways send some numeric fields as JSON numbers and others as strings
fn optional_str(payload: &Value, key: &str) -> Option<String> {
    match payload.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn required_str(payload: &Value, key: &str) -> Result<String, GatewayError> {
    optional_str(payload, key)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| GatewayError::InvalidPayload(format!("missing field `{key}`")))
}
