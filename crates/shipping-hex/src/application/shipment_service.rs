//! The Ship workflow: resolve parties and addresses, shop rates, buy a label and record
//! the result on the transaction.
//!
//! A transaction gets at most one carrier order: when `platformData.shippypro.orderId`
//! is already set the existing order is re-queried instead of buying a new label.
//! Recording the order on the transaction is best effort. Once the label is bought a
//! failed patch is logged and swallowed, so a caller never retries into a second label.

use serde_json::Value;
use shipping_types::domain::address::{Address, ContactFallback};
use shipping_types::domain::carrier::{
    CarrierCall, CarrierRate, Parcel, RateRequest, RatesResponse, ShipRequest, ShipmentResult,
    GET_RATES,
};
use shipping_types::domain::money::{format_total_value, minor_to_major};
use shipping_types::domain::transaction::{ShipmentPatch, ShippyproRecord, TrackingInfo, Transaction};
use shipping_types::domain::user::User;
use shipping_types::ports::carrier_api::CarrierError;
use std::sync::Arc;

use crate::application::config_resolver::ResolvedConfig;
use crate::application::context::{CallerContext, GatewayContext};
use crate::errors::AppError;

pub struct ShipmentService {
    ctx: Arc<GatewayContext>,
}

/// Everything the carrier calls need, resolved and validated once.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipmentPlan {
    pub carrier: String,
    pub parcel: Parcel,
    pub from_address: Address,
    pub to_address: Address,
    /// e.g. `"108 USD"`
    pub total_value: String,
    pub content_description: String,
    pub shipment_cost: f64,
    pub amount_paid: f64,
}

impl ShipmentPlan {
    /// Steps 4 to 6 of the workflow: carrier, pricing, addresses and amounts.
    pub fn build(
        tx: &Transaction,
        owner: &User,
        taker: &User,
        config: &ResolvedConfig,
    ) -> Result<Self, AppError> {
        let settings = &config.carrier_settings;

        let carrier = tx
            .metadata
            .carrier
            .clone()
            .filter(|c| !c.trim().is_empty())
            .or_else(|| settings.default_carrier.clone())
            .ok_or_else(|| AppError::BadRequest("no carrier selected".into()))?;

        let size = tx
            .packaging_size()
            .or(settings.default_packaging_size.as_deref())
            .ok_or_else(|| AppError::BadRequest("no packaging size".into()))?;
        let pricing = settings.pricing_for(&carrier, size).ok_or_else(|| {
            AppError::BadRequest(format!("no {carrier} pricing for packaging size {size}"))
        })?;

        let destination = tx
            .metadata
            .address
            .clone()
            .filter(|a| a.has_street())
            .ok_or_else(|| AppError::BadRequest("no address".into()))?;

        let origin = owner
            .verified_address()
            .cloned()
            .ok_or_else(|| AppError::BadRequest("owner has no verified address".into()))?;
        let from_address = origin
            .resolve(ContactFallback {
                name: owner.display_name(),
                email: owner.email.clone(),
                phone: owner.verified_phone(),
            })
            .map_err(|e| AppError::BadRequest(format!("from_address: {e}")))?;

        let to_address = destination
            .resolve(ContactFallback {
                name: recipient_name(tx).or_else(|| taker.display_name()),
                email: taker.email.clone(),
                phone: taker.verified_phone(),
            })
            .map_err(|e| AppError::BadRequest(format!("to_address: {e}")))?;

        let fare = tx.metadata.shipping_fare.unwrap_or(0);
        let transfer = tx.metadata.taker_transfer.unwrap_or(0);
        let declared = tx
            .taker_amount
            .checked_add(pricing.price)
            .and_then(|v| v.checked_add(settings.fixed_fee))
            .ok_or_else(|| AppError::BadRequest("declared value out of range".into()))?;
        let paid = fare
            .checked_add(transfer)
            .ok_or_else(|| AppError::BadRequest("amount paid out of range".into()))?;

        Ok(Self {
            carrier,
            parcel: pricing.dimensions,
            from_address,
            to_address,
            total_value: format_total_value(declared, &tx.currency),
            content_description: tx.content_description(),
            shipment_cost: minor_to_major(fare),
            amount_paid: minor_to_major(paid),
        })
    }

    pub fn rate_request(&self) -> RateRequest {
        RateRequest {
            to_address: self.to_address.clone(),
            from_address: self.from_address.clone(),
            parcels: vec![self.parcel],
            total_value: self.total_value.clone(),
            content_description: self.content_description.clone(),
            shipping_service: "Standard".into(),
        }
    }

    pub fn ship_request(&self, rate: &CarrierRate, transaction_id: &str) -> ShipRequest {
        ShipRequest {
            to_address: self.to_address.clone(),
            from_address: self.from_address.clone(),
            parcels: vec![self.parcel],
            total_value: self.total_value.clone(),
            transaction_id: transaction_id.to_string(),
            content_description: self.content_description.clone(),
            carrier_name: rate.carrier_name.clone(),
            carrier_service: rate.service.clone(),
            carrier_id: rate.carrier_id.clone(),
            rate_id: rate.rate_id.clone(),
            order_id: rate.order_id.clone(),
            shipment_cost: self.shipment_cost,
            amount_paid: self.amount_paid,
            shipping_service: "Standard".into(),
        }
    }
}

/// Recipient name from the transaction metadata, when given.
fn recipient_name(tx: &Transaction) -> Option<String> {
    let name = [tx.metadata.first_name.as_deref(), tx.metadata.last_name.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!name.is_empty()).then_some(name)
}

impl ShipmentService {
    pub fn new(ctx: Arc<GatewayContext>) -> Self {
        Self { ctx }
    }

    /// Runs the workflow for an already resolved and authorized transaction.
    pub async fn ship(
        &self,
        caller: &CallerContext,
        config: &ResolvedConfig,
        tx: Transaction,
    ) -> Result<Value, AppError> {
        let scope = &caller.scope;
        let credentials = &config.credentials;

        if let Some(order_id) = tx.existing_order_id() {
            tracing::info!(
                platform = %scope,
                transaction_id = %tx.id,
                order_id,
                "shipment already created, returning existing order"
            );
            return self
                .ctx
                .call_carrier(scope, credentials, &CarrierCall::get_order(order_id))
                .await;
        }

        let (owner, taker) = self.resolve_parties(caller, &tx).await?;
        let plan = ShipmentPlan::build(&tx, &owner, &taker, config)?;

        let rates_raw = self
            .ctx
            .call_carrier(scope, credentials, &CarrierCall::GetRates(plan.rate_request()))
            .await?;
        let rates: RatesResponse = serde_json::from_value(rates_raw).map_err(|e| {
            self.ctx
                .upstream_error(scope, GET_RATES, CarrierError::Decode(e.to_string()))
        })?;
        let rate = rates.for_carrier(&plan.carrier).ok_or_else(|| {
            AppError::NotFound(format!("no {} rate returned by the carrier", plan.carrier))
        })?;

        let response = self
            .ctx
            .call_carrier(
                scope,
                credentials,
                &CarrierCall::Ship(plan.ship_request(rate, &tx.id)),
            )
            .await?;
        tracing::info!(
            platform = %scope,
            request_id = %caller.request_id,
            transaction_id = %tx.id,
            carrier = %plan.carrier,
            "label purchased"
        );

        self.record_shipment(caller, &tx.id, &response).await;
        Ok(response)
    }

    async fn resolve_parties(&self, caller: &CallerContext, tx: &Transaction) -> Result<(User, User), AppError> {
        let users = self.ctx.users.clone();
        let read = |role: &'static str, id: Option<String>| {
            let users = users.clone();
            let scope = caller.scope.clone();
            async move {
                let id = id.ok_or_else(|| AppError::BadRequest(format!("transaction has no {role}")))?;
                users
                    .read(&scope, &id)
                    .await?
                    .ok_or_else(|| AppError::BadRequest(format!("{role} {id} not found")))
            }
        };
        tokio::try_join!(
            read("owner", tx.owner_id.clone()),
            read("taker", tx.taker_id.clone())
        )
    }

    async fn record_shipment(&self, caller: &CallerContext, transaction_id: &str, response: &Value) {
        let result: ShipmentResult = match serde_json::from_value(response.clone()) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(transaction_id, error = %e, "unreadable Ship response, transaction not updated");
                return;
            }
        };
        let Some(order_id) = result.new_order_id.clone() else {
            return;
        };

        let patch = ShipmentPatch {
            tracking: TrackingInfo {
                number: result.tracking_number.clone(),
                link: result.tracking_link.clone(),
            },
            shippypro: ShippyproRecord {
                order_id: Some(order_id),
                label_url: result.first_label_url().map(String::from),
            },
        };
        match self
            .ctx
            .transactions
            .update(&caller.scope, transaction_id, &patch)
            .await
        {
            Ok(Some(_)) => {}
            Ok(None) => tracing::error!(
                platform = %caller.scope,
                transaction_id,
                "transaction vanished before shipment could be recorded"
            ),
            Err(e) => tracing::error!(
                platform = %caller.scope,
                transaction_id,
                error = %e,
                "failed to record shipment on transaction"
            ),
        }
    }
}
