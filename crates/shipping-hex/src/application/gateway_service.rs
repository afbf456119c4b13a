use serde_json::{Map, Value};
use shipping_types::domain::carrier::{CarrierCall, SHIP};
use shipping_types::domain::transaction::Transaction;
use std::sync::Arc;

use crate::application::authorization::{self, Decision};
use crate::application::config_resolver;
use crate::application::context::{CallerContext, GatewayContext};
use crate::application::shipment_service::ShipmentService;
use crate::errors::AppError;

/// Entry point for "send request" calls: authorizes, then forwards to the carrier or
/// hands shipment creation to the [`ShipmentService`].
pub struct GatewayService {
    ctx: Arc<GatewayContext>,
    shipments: ShipmentService,
}

/// `transactionId` named by the invocation parameters, if any.
fn transaction_id_of(params: &Value) -> Result<Option<String>, AppError> {
    match params.get("transactionId") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(id)) if !id.trim().is_empty() => Ok(Some(id.clone())),
        Some(_) => Err(AppError::BadRequest(
            "transactionId must be a non-empty string".into(),
        )),
    }
}

impl GatewayService {
    pub fn new(ctx: Arc<GatewayContext>) -> Self {
        Self {
            shipments: ShipmentService::new(ctx.clone()),
            ctx,
        }
    }

    pub async fn send_request(
        &self,
        caller: &CallerContext,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Value, AppError> {
        let config = config_resolver::resolve_for_requests(self.ctx.config.as_ref(), &caller.scope).await?;

        let params = args
            .into_iter()
            .next()
            .unwrap_or_else(|| Value::Object(Map::new()));

        // ownership can only be checked against a resolved transaction
        let transaction = match transaction_id_of(&params)? {
            Some(id) => Some(self.read_transaction(caller, &id).await?),
            None => None,
        };

        if let Decision::Deny(reason) = authorization::decide(caller, method, transaction.as_ref()) {
            tracing::warn!(
                platform = %caller.scope,
                request_id = %caller.request_id,
                method,
                %reason,
                "request denied"
            );
            return Err(AppError::Forbidden(reason.to_string()));
        }

        if method == SHIP {
            let transaction = transaction
                .ok_or_else(|| AppError::BadRequest("transactionId expected".into()))?;
            return self.shipments.ship(caller, &config, transaction).await;
        }

        let call = CarrierCall::from_invocation(method, params)
            .map_err(|e| AppError::BadRequest(format!("invalid {method} parameters: {e}")))?;
        self.ctx
            .call_carrier(&caller.scope, &config.credentials, &call)
            .await
    }

    async fn read_transaction(&self, caller: &CallerContext, id: &str) -> Result<Transaction, AppError> {
        self.ctx
            .transactions
            .read(&caller.scope, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("transaction {id}")))
    }
}
