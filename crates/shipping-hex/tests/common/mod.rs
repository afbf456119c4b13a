#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use shipping_hex::application::context::{CallerContext, GatewayContext};
use shipping_repo::memory::{
    InMemoryConfigStore, InMemoryEventStore, InMemoryTransactionStore, InMemoryUserStore,
};
use shipping_types::domain::carrier::CarrierCall;
use shipping_types::domain::integration::{Credentials, IntegrationConfig};
use shipping_types::domain::platform::{PlatformEnv, PlatformScope};
use shipping_types::domain::transaction::Transaction;
use shipping_types::domain::user::User;
use shipping_types::ports::carrier_api::{CarrierApi, CarrierError};
use shipping_types::ports::transaction_store::TransactionStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const OWNER: &str = "usr_owner";
pub const TAKER: &str = "usr_taker";
pub const WEBHOOK_SECRET: &str = "whsec_1";

/// Carrier double: answers from a script keyed by method name and records every call.
#[derive(Default)]
pub struct RecordingCarrier {
    script: Mutex<HashMap<String, Result<Value, CarrierError>>>,
    calls: Mutex<Vec<(Credentials, CarrierCall)>>,
}

impl RecordingCarrier {
    pub fn respond(&self, method: &str, response: Result<Value, CarrierError>) {
        self.script
            .lock()
            .unwrap()
            .insert(method.to_string(), response);
    }

    pub fn calls(&self) -> Vec<CarrierCall> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, c)| c.clone())
            .collect()
    }

    pub fn credentials(&self) -> Vec<Credentials> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(c, _)| c.clone())
            .collect()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.method_name() == method)
            .count()
    }
}

#[async_trait]
impl CarrierApi for RecordingCarrier {
    async fn invoke(
        &self,
        credentials: &Credentials,
        call: &CarrierCall,
    ) -> Result<Value, CarrierError> {
        self.calls
            .lock()
            .unwrap()
            .push((credentials.clone(), call.clone()));
        self.script
            .lock()
            .unwrap()
            .get(call.method_name())
            .cloned()
            .unwrap_or_else(|| Ok(json!({ "Result": "OK" })))
    }
}

pub struct Harness {
    pub config: InMemoryConfigStore,
    pub transactions: InMemoryTransactionStore,
    pub users: InMemoryUserStore,
    pub events: Arc<InMemoryEventStore>,
    pub carrier: Arc<RecordingCarrier>,
    pub ctx: Arc<GatewayContext>,
}

pub fn test_scope() -> PlatformScope {
    PlatformScope::new("1", PlatformEnv::Test)
}

pub fn live_scope() -> PlatformScope {
    PlatformScope::new("1", PlatformEnv::Live)
}

pub fn integration_config() -> IntegrationConfig {
    serde_json::from_value(json!({
        "apiKey": "sk_test",
        "baseUri": "http://carrier.invalid/api",
        "webhookSecret": WEBHOOK_SECRET,
        "carrierSettings": {
            "defaultCarrier": "DHL",
            "fixedFee": 300,
            "pricing": [{ "size": "M", "price": 500,
                "dimensions": { "length": 30, "width": 20, "height": 10, "weight": 2 } }]
        }
    }))
    .unwrap()
}

pub fn transaction(id: &str, metadata: Value) -> Transaction {
    serde_json::from_value(json!({
        "id": id,
        "ownerId": OWNER,
        "takerId": TAKER,
        "currency": "USD",
        "takerAmount": 10000,
        "metadata": metadata,
        "assetSnapshot": { "name": "Camera", "customAttributes": { "packagingSize": "M" } }
    }))
    .unwrap()
}

pub fn shippable_metadata() -> Value {
    json!({
        "address": { "street1": "9 Elm St", "city": "Austin", "zip": "73301", "country": "US" },
        "shippingFare": 1250,
        "takerTransfer": 250
    })
}

fn users() -> Vec<User> {
    vec![
        serde_json::from_value(json!({
            "id": OWNER, "firstname": "Olivia", "lastname": "Owner", "email": "olivia@example.com",
            "platformData": { "_private": { "verified": { "individualInfo": {
                "street1": "1 Main St", "city": "Boston", "zip": "02101", "country": "US",
                "phone": "+15550001"
            } } } }
        }))
        .unwrap(),
        serde_json::from_value(json!({
            "id": TAKER, "firstname": "Tom", "lastname": "Taker", "email": "tom@example.com"
        }))
        .unwrap(),
    ]
}

pub fn rates_response() -> Value {
    json!({ "Rates": [
        { "carrier": "UPS", "service": "Ground", "carrier_id": 3, "rate_id": "r_ups", "order_id": 41, "rate": "9.90" },
        { "carrier": "DHL", "service": "Express", "carrier_id": 7, "rate_id": "r_dhl", "order_id": 42, "rate": 12.5 }
    ] })
}

pub fn ship_response() -> Value {
    json!({
        "NewOrderID": 555,
        "TrackingNumber": "TRK123",
        "TrackingExternalLink": "https://track.example/TRK123",
        "LabelURL": ["https://labels.example/1.pdf", "https://labels.example/2.pdf"]
    })
}

impl Harness {
    pub fn new(production: bool) -> Self {
        Self::with_transactions(production, None)
    }

    /// `transactions` replaces the transaction store seen by the gateway.
    pub fn with_transactions(production: bool, transactions: Option<Arc<dyn TransactionStore>>) -> Self {
        let config = InMemoryConfigStore::new();
        config.insert(test_scope(), integration_config());
        config.insert(live_scope(), integration_config());

        let tx_store = InMemoryTransactionStore::new();
        tx_store.insert(&test_scope(), transaction("trn_1", shippable_metadata()));
        tx_store.insert(&live_scope(), transaction("trn_1", shippable_metadata()));

        let user_store = InMemoryUserStore::new();
        for user in users() {
            user_store.insert(&test_scope(), user.clone());
            user_store.insert(&live_scope(), user);
        }

        let events = Arc::new(InMemoryEventStore::new());
        let carrier = Arc::new(RecordingCarrier::default());
        carrier.respond("GetRates", Ok(rates_response()));
        carrier.respond("Ship", Ok(ship_response()));

        let ctx = Arc::new(GatewayContext {
            config: Arc::new(config.clone()),
            transactions: transactions
                .unwrap_or_else(|| Arc::new(tx_store.clone()) as Arc<dyn TransactionStore>),
            users: Arc::new(user_store.clone()),
            events: events.clone(),
            carrier: carrier.clone(),
            production,
        });

        Self {
            config,
            transactions: tx_store,
            users: user_store,
            events,
            carrier,
            ctx,
        }
    }
}

pub fn caller(public_id: &str, user: Option<&str>, permissions: &[&str]) -> CallerContext {
    CallerContext::from_public_id(
        public_id,
        "req_1",
        user.map(String::from),
        permissions.iter().map(|p| p.to_string()),
    )
    .unwrap()
}
