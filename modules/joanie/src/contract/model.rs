use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Page of a paginated Joanie listing.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Paginated<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

// ---------- addresses ----------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Address {
    pub id: String,
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub postcode: String,
    pub city: String,
    pub country: String,
    #[serde(default)]
    pub is_main: bool,
}

/// Address form content (an address without its id).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AddressPayload {
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub postcode: String,
    pub city: String,
    pub country: String,
    #[serde(default)]
    pub is_main: bool,
}

impl From<&Address> for AddressPayload {
    fn from(a: &Address) -> Self {
        Self {
            title: a.title.clone(),
            first_name: a.first_name.clone(),
            last_name: a.last_name.clone(),
            address: a.address.clone(),
            postcode: a.postcode.clone(),
            city: a.city.clone(),
            country: a.country.clone(),
            is_main: a.is_main,
        }
    }
}

// ---------- credit cards ----------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CreditCard {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    pub expiration_month: u8,
    pub expiration_year: u16,
    pub last_numbers: String,
    #[serde(default)]
    pub is_main: bool,
}

/// Editable part of a credit card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreditCardPatch {
    pub title: Option<String>,
    pub is_main: bool,
}

impl From<&CreditCard> for CreditCardPatch {
    fn from(card: &CreditCard) -> Self {
        Self {
            title: card.title.clone(),
            is_main: card.is_main,
        }
    }
}

// ---------- orders ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    Draft,
    Assigned,
    ToSignAndToSavePaymentMethod,
    ToSavePaymentMethod,
    ToSign,
    Signing,
    PendingPayment,
    Pending,
    NoPayment,
    FailedPayment,
    Completed,
    Canceled,
    Refunding,
    Refunded,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Order {
    pub id: String,
    pub state: OrderState,
    pub product_id: String,
    #[serde(default)]
    pub course: Option<serde_json::Value>,
    #[serde(default)]
    pub enrollment: Option<serde_json::Value>,
    #[serde(default)]
    pub organization_id: Option<String>,
    pub total: f64,
    pub total_currency: String,
    pub created_on: DateTime<Utc>,
    #[serde(default)]
    pub main_invoice_reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderPayload {
    pub product_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<AddressPayload>,
    #[serde(default)]
    pub has_waived_withdrawal_right: bool,
}

/// Filters of the order listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderQuery {
    pub product_id: Option<String>,
    pub course_code: Option<String>,
    pub enrollment_id: Option<String>,
    pub states: Vec<OrderState>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

// ---------- contracts ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractState {
    Unsigned,
    HalfSigned,
    Signed,
}

impl ContractState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unsigned => "unsigned",
            Self::HalfSigned => "half_signed",
            Self::Signed => "signed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContractDefinition {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Contract {
    pub id: String,
    pub created_on: DateTime<Utc>,
    #[serde(default)]
    pub student_signed_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub organization_signed_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub definition: Option<ContractDefinition>,
}

impl Contract {
    pub fn state(&self) -> ContractState {
        match (self.student_signed_on, self.organization_signed_on) {
            (Some(_), Some(_)) => ContractState::Signed,
            (Some(_), None) => ContractState::HalfSigned,
            _ => ContractState::Unsigned,
        }
    }
}

/// Filters of contract listings and archive generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractResourceQuery {
    pub organization_id: Option<String>,
    pub offering_id: Option<String>,
    pub contract_ids: Vec<String>,
    pub signature_state: Option<ContractState>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ContractResourceQuery {
    /// Query string pairs, repeated keys for `contract_ids`.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = &self.organization_id {
            pairs.push(("organization_id", id.clone()));
        }
        if let Some(id) = &self.offering_id {
            pairs.push(("offering_id", id.clone()));
        }
        for id in &self.contract_ids {
            pairs.push(("contract_ids", id.clone()));
        }
        if let Some(state) = self.signature_state {
            pairs.push(("signature_state", state.as_str().to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(size) = self.page_size {
            pairs.push(("page_size", size.to_string()));
        }
        pairs
    }
}

/// Body of an archive generation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContractArchiveRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offering_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ContractArchiveCreated {
    pub url: String,
}

// ---------- organizations ----------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Organization {
    pub id: String,
    pub code: String,
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_order_state_is_tolerated() {
        let state: OrderState = serde_json::from_str("\"some_future_state\"").unwrap();
        assert_eq!(state, OrderState::Unknown);
        let state: OrderState = serde_json::from_str("\"to_sign\"").unwrap();
        assert_eq!(state, OrderState::ToSign);
    }

    #[test]
    fn test_contract_state_from_signatures() {
        let mut contract: Contract = serde_json::from_value(serde_json::json!({
            "id": "c1",
            "created_on": "2024-01-01T00:00:00Z",
        }))
        .unwrap();
        assert_eq!(contract.state(), ContractState::Unsigned);

        contract.student_signed_on = Some(contract.created_on);
        assert_eq!(contract.state(), ContractState::HalfSigned);

        contract.organization_signed_on = Some(contract.created_on);
        assert_eq!(contract.state(), ContractState::Signed);
    }

    #[test]
    fn test_contract_query_pairs() {
        let query = ContractResourceQuery {
            organization_id: Some("org".into()),
            contract_ids: vec!["a".into(), "b".into()],
            signature_state: Some(ContractState::Signed),
            ..Default::default()
        };
        assert_eq!(
            query.to_pairs(),
            vec![
                ("organization_id", "org".to_string()),
                ("contract_ids", "a".to_string()),
                ("contract_ids", "b".to_string()),
                ("signature_state", "signed".to_string()),
            ]
        );
    }
}
