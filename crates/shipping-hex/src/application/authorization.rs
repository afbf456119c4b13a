use shipping_types::domain::carrier::{GET_RATES, SHIP};
use shipping_types::domain::transaction::Transaction;
use std::fmt;

use crate::application::context::CallerContext;

/// Full read/write on this integration.
pub const ELEVATED_PERMISSIONS: [&str; 2] = [
    "integrations:read_write:shippypro",
    "integrations:read_write:all",
];

/// Methods any caller may use on transactions they own.
pub const CALLER_SAFE_METHODS: [&str; 2] = [GET_RATES, SHIP];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    MethodNotAllowed,
    NotTransactionOwner,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::MethodNotAllowed => write!(f, "method not allowed"),
            DenyReason::NotTransactionOwner => write!(f, "caller does not own the transaction"),
        }
    }
}

/// Pure allow/deny decision, evaluated before any carrier call.
pub fn decide(caller: &CallerContext, method: &str, transaction: Option<&Transaction>) -> Decision {
    if ELEVATED_PERMISSIONS.iter().any(|p| caller.has_permission(p)) {
        return Decision::Allow;
    }
    if !CALLER_SAFE_METHODS.contains(&method) {
        return Decision::Deny(DenyReason::MethodNotAllowed);
    }
    match transaction {
        None => Decision::Allow,
        Some(tx) => {
            let owns = matches!(
                (caller.current_user_id.as_deref(), tx.owner_id.as_deref()),
                (Some(caller_id), Some(owner_id)) if caller_id == owner_id
            );
            if owns {
                Decision::Allow
            } else {
                Decision::Deny(DenyReason::NotTransactionOwner)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn caller(user: Option<&str>, permissions: &[&str]) -> CallerContext {
        CallerContext::from_public_id(
            "e1_test",
            "req_1",
            user.map(String::from),
            permissions.iter().map(|p| p.to_string()),
        )
        .unwrap()
    }

    fn tx(owner: &str) -> Transaction {
        serde_json::from_value(json!({
            "id": "trn_1", "ownerId": owner, "takerId": "usr_taker", "currency": "EUR"
        }))
        .unwrap()
    }

    #[test]
    fn elevated_callers_are_always_allowed() {
        let c = caller(None, &["integrations:read_write:all"]);
        assert_eq!(decide(&c, "CancelOrder", Some(&tx("someone"))), Decision::Allow);
        let c = caller(None, &["integrations:read_write:shippypro"]);
        assert_eq!(decide(&c, "GetOrder", None), Decision::Allow);
    }

    #[test]
    fn methods_outside_the_allow_list_are_denied() {
        let c = caller(Some("usr_owner"), &["integrations:read:shippypro"]);
        assert_eq!(
            decide(&c, "GetOrder", Some(&tx("usr_owner"))),
            Decision::Deny(DenyReason::MethodNotAllowed)
        );
    }

    #[test]
    fn safe_methods_require_ownership_when_a_transaction_is_named() {
        let owner = caller(Some("usr_owner"), &[]);
        assert_eq!(decide(&owner, SHIP, Some(&tx("usr_owner"))), Decision::Allow);
        assert_eq!(decide(&owner, GET_RATES, None), Decision::Allow);

        let stranger = caller(Some("usr_other"), &[]);
        assert_eq!(
            decide(&stranger, SHIP, Some(&tx("usr_owner"))),
            Decision::Deny(DenyReason::NotTransactionOwner)
        );

        let anonymous = caller(None, &[]);
        assert_eq!(
            decide(&anonymous, GET_RATES, Some(&tx("usr_owner"))),
            Decision::Deny(DenyReason::NotTransactionOwner)
        );
    }
}
