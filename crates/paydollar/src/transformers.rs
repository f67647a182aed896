//! Typed wire requests per operation family.
//!
//! Each operation gets an explicit request struct whose fields are renamed to
//! the processor's wire contract, so a field-name typo fails at compile time
//! instead of on the wire. Structs serialize to the `&`-joined,
//! percent-encoded body with `serde_urlencoded`.

use error_stack::ResultExt;
use masking::{PeekInterface, Secret};
use serde::Serialize;

use crate::{
    crypto,
    errors::{CustomResult, PaydollarError},
    options::{PaymentOptions, ScheduleType},
    types::{split_name, Address, Card, CardBrand, Currency, Language, MinorUnit},
};

/// Direct-payment transaction kind: `N` settles immediately, `H` places a
/// hold for a later capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PayType {
    #[serde(rename = "N")]
    Normal,
    #[serde(rename = "H")]
    Hold,
}

impl PayType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Normal => "N",
            Self::Hold => "H",
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PaydollarPaymentsRequest {
    Card(Box<CardPaymentRequest>),
    MemberPay(MemberPayPaymentRequest),
}

impl PaydollarPaymentsRequest {
    pub fn encode(&self) -> CustomResult<String, PaydollarError> {
        encode_body(self)
    }
}

pub fn encode_body<T: Serialize>(request: &T) -> CustomResult<String, PaydollarError> {
    serde_urlencoded::to_string(request).change_context(PaydollarError::RequestEncodingFailed)
}

#[derive(Debug, Serialize)]
pub struct CardPaymentRequest {
    #[serde(rename = "merchantId")]
    merchant_id: String,
    #[serde(rename = "orderRef", skip_serializing_if = "Option::is_none")]
    order_ref: Option<String>,
    #[serde(rename = "currCode", skip_serializing_if = "Option::is_none")]
    curr_code: Option<Currency>,
    amount: String,
    #[serde(rename = "payType")]
    pay_type: PayType,
    #[serde(skip_serializing_if = "Option::is_none")]
    lang: Option<Language>,
    #[serde(rename = "pMethod")]
    p_method: CardBrand,
    #[serde(rename = "epMonth")]
    exp_month: Secret<String>,
    #[serde(rename = "epYear")]
    exp_year: Secret<String>,
    #[serde(rename = "cardNo")]
    card_number: Secret<String>,
    #[serde(rename = "cardHolder")]
    card_holder: Secret<String>,
    #[serde(rename = "securityCode")]
    security_code: Secret<String>,
    #[serde(rename = "billingFirstName", skip_serializing_if = "Option::is_none")]
    billing_first_name: Option<String>,
    #[serde(rename = "billingLastName", skip_serializing_if = "Option::is_none")]
    billing_last_name: Option<String>,
    #[serde(rename = "billingStreet1", skip_serializing_if = "Option::is_none")]
    billing_street1: Option<Secret<String>>,
    #[serde(rename = "billingStreet2", skip_serializing_if = "Option::is_none")]
    billing_street2: Option<Secret<String>>,
    #[serde(rename = "billingCity", skip_serializing_if = "Option::is_none")]
    billing_city: Option<String>,
    #[serde(rename = "billingState", skip_serializing_if = "Option::is_none")]
    billing_state: Option<String>,
    #[serde(rename = "billingPostalCode", skip_serializing_if = "Option::is_none")]
    billing_postal_code: Option<Secret<String>>,
    #[serde(rename = "billingCountry", skip_serializing_if = "Option::is_none")]
    billing_country: Option<String>,
    #[serde(rename = "billingEmail", skip_serializing_if = "Option::is_none")]
    billing_email: Option<Secret<String>>,
    #[serde(rename = "custIPAddress", skip_serializing_if = "Option::is_none")]
    cust_ip_address: Option<Secret<String>>,
    #[serde(rename = "secureHash", skip_serializing_if = "Option::is_none")]
    secure_hash: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MemberPayPaymentRequest {
    #[serde(rename = "merchantId")]
    merchant_id: String,
    #[serde(rename = "orderRef", skip_serializing_if = "Option::is_none")]
    order_ref: Option<String>,
    #[serde(rename = "currCode", skip_serializing_if = "Option::is_none")]
    curr_code: Option<Currency>,
    amount: String,
    #[serde(rename = "payType")]
    pay_type: PayType,
    #[serde(skip_serializing_if = "Option::is_none")]
    lang: Option<Language>,
    /// Fixed flag telling the direct-payment endpoint this is a member-pay
    /// transaction.
    #[serde(rename = "memberPay_service")]
    member_pay_service: &'static str,
    #[serde(rename = "memberPay_memberId")]
    member_pay_member_id: String,
    #[serde(rename = "memberPay_token")]
    member_pay_token: Secret<String>,
    #[serde(rename = "secureHash", skip_serializing_if = "Option::is_none")]
    secure_hash: Option<String>,
}

pub struct CardPaymentContext<'a> {
    pub pay_type: PayType,
    pub amount: MinorUnit,
    pub card: &'a Card,
    pub options: &'a PaymentOptions,
}

impl TryFrom<&CardPaymentContext<'_>> for PaydollarPaymentsRequest {
    type Error = error_stack::Report<PaydollarError>;

    fn try_from(item: &CardPaymentContext<'_>) -> Result<Self, Self::Error> {
        let merchant_id = item.options.require_merchant()?.to_string();
        let amount = item.amount.to_major_unit_string();
        let billing = BillingFields::from(item.options.address.as_ref());
        let secure_hash = sign_payment(&merchant_id, &amount, item.pay_type, item.options);

        Ok(Self::Card(Box::new(CardPaymentRequest {
            merchant_id,
            order_ref: item.options.order_id.clone(),
            curr_code: item.options.currency,
            amount,
            pay_type: item.pay_type,
            lang: item.options.lang,
            p_method: item.card.brand,
            exp_month: item.card.card_exp_month.clone(),
            exp_year: item.card.card_exp_year.clone(),
            card_number: item.card.card_number.clone(),
            card_holder: item.card.card_holder_name.clone(),
            security_code: item.card.card_cvc.clone(),
            billing_first_name: billing.first_name,
            billing_last_name: billing.last_name,
            billing_street1: billing.street1,
            billing_street2: billing.street2,
            billing_city: billing.city,
            billing_state: billing.state,
            billing_postal_code: billing.postal_code,
            billing_country: billing.country,
            billing_email: billing.email,
            cust_ip_address: billing.ip,
            secure_hash,
        })))
    }
}

pub struct TokenPaymentContext<'a> {
    pub pay_type: PayType,
    pub amount: MinorUnit,
    pub member_id: &'a str,
    pub one_time_token: Secret<String>,
    pub options: &'a PaymentOptions,
}

impl TryFrom<&TokenPaymentContext<'_>> for PaydollarPaymentsRequest {
    type Error = error_stack::Report<PaydollarError>;

    fn try_from(item: &TokenPaymentContext<'_>) -> Result<Self, Self::Error> {
        let merchant_id = item.options.require_merchant()?.to_string();
        let amount = item.amount.to_major_unit_string();
        let secure_hash = sign_payment(&merchant_id, &amount, item.pay_type, item.options);

        Ok(Self::MemberPay(MemberPayPaymentRequest {
            merchant_id,
            order_ref: item.options.order_id.clone(),
            curr_code: item.options.currency,
            amount,
            pay_type: item.pay_type,
            lang: item.options.lang,
            member_pay_service: "T",
            member_pay_member_id: item.member_id.to_string(),
            member_pay_token: item.one_time_token.clone(),
            secure_hash,
        }))
    }
}

// The secure hash authenticates direct-payment requests in place of the
// login/password pair. It covers order reference and currency, so it is only
// attached when the secret and both covered fields are present.
fn sign_payment(
    merchant_id: &str,
    amount: &str,
    pay_type: PayType,
    options: &PaymentOptions,
) -> Option<String> {
    match (
        options.secure_hash_secret.as_ref(),
        options.order_id.as_deref(),
        options.currency,
    ) {
        (Some(secret), Some(order_ref), Some(currency)) => Some(crypto::secure_hash(
            merchant_id,
            order_ref,
            currency.numeric_code(),
            amount,
            pay_type.code(),
            secret,
        )),
        _ => None,
    }
}

#[derive(Default)]
struct BillingFields {
    first_name: Option<String>,
    last_name: Option<String>,
    street1: Option<Secret<String>>,
    street2: Option<Secret<String>>,
    city: Option<String>,
    state: Option<String>,
    postal_code: Option<Secret<String>>,
    country: Option<String>,
    email: Option<Secret<String>>,
    ip: Option<Secret<String>>,
}

impl From<Option<&Address>> for BillingFields {
    fn from(address: Option<&Address>) -> Self {
        let Some(address) = address else {
            return Self::default();
        };
        let (first_name, last_name) = match address.name.as_ref() {
            Some(name) => {
                let (first, last) = split_name(name.peek());
                (Some(first), last)
            }
            None => (None, None),
        };
        Self {
            first_name,
            last_name,
            street1: address.street1.clone(),
            street2: address.street2.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            postal_code: address.postal_code.clone(),
            country: address.country.clone(),
            email: address.email.clone(),
            ip: address.ip.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderAction {
    Capture,
    Void,
    Reverse,
}

/// Order-management request: capture, void or reverse a prior authorization,
/// authenticated with the login/password pair.
#[derive(Debug, Serialize)]
pub struct OrderManagementRequest {
    #[serde(rename = "loginId")]
    login_id: Secret<String>,
    password: Secret<String>,
    #[serde(rename = "actionType")]
    action_type: OrderAction,
    #[serde(rename = "payRef")]
    pay_ref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<String>,
    #[serde(rename = "merchantId")]
    merchant_id: String,
}

pub struct OrderManagementContext<'a> {
    pub action: OrderAction,
    pub authorization: &'a str,
    pub amount: Option<MinorUnit>,
    pub options: &'a PaymentOptions,
}

impl TryFrom<&OrderManagementContext<'_>> for OrderManagementRequest {
    type Error = error_stack::Report<PaydollarError>;

    fn try_from(item: &OrderManagementContext<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            login_id: item.options.require_login()?.clone(),
            password: item.options.require_password()?.clone(),
            action_type: item.action,
            pay_ref: item.authorization.to_string(),
            amount: item.amount.map(|amount| amount.to_major_unit_string()),
            merchant_id: item.options.require_merchant()?.to_string(),
        })
    }
}

const MEMBER_STATUS_ACTIVE: &str = "A";

/// Membership-API request: creates (or replaces) a member, optionally storing
/// card details against it. Authenticated with the merchant-API-id/password
/// pair.
#[derive(Debug, Serialize)]
pub struct MembershipRequest {
    #[serde(rename = "merchantApiId")]
    merchant_api_id: Secret<String>,
    password: Secret<String>,
    #[serde(rename = "actionType")]
    action_type: &'static str,
    status: &'static str,
    #[serde(rename = "memberId")]
    member_id: String,
    #[serde(rename = "firstName", skip_serializing_if = "Option::is_none")]
    first_name: Option<String>,
    #[serde(rename = "lastName", skip_serializing_if = "Option::is_none")]
    last_name: Option<String>,
    #[serde(rename = "memberGroupId")]
    member_group_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    replace: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    account: Option<Secret<String>>,
    #[serde(rename = "expYear", skip_serializing_if = "Option::is_none")]
    exp_year: Option<Secret<String>>,
    #[serde(rename = "expMonth", skip_serializing_if = "Option::is_none")]
    exp_month: Option<Secret<String>>,
    #[serde(rename = "holderName", skip_serializing_if = "Option::is_none")]
    holder_name: Option<Secret<String>>,
    #[serde(rename = "acctStatus", skip_serializing_if = "Option::is_none")]
    acct_status: Option<&'static str>,
    #[serde(rename = "merchantId")]
    merchant_id: String,
}

pub struct MembershipContext<'a> {
    pub card: Option<&'a Card>,
    pub options: &'a PaymentOptions,
}

impl TryFrom<&MembershipContext<'_>> for MembershipRequest {
    type Error = error_stack::Report<PaydollarError>;

    fn try_from(item: &MembershipContext<'_>) -> Result<Self, Self::Error> {
        let (first_name, last_name) = match item.options.name.as_ref() {
            Some(name) => {
                let (first, last) = split_name(name.peek());
                (Some(first), last)
            }
            None => (None, None),
        };
        // The member group is required by the API; group 1 is the processor's
        // default group.
        let member_group_id = item
            .options
            .member_group
            .clone()
            .unwrap_or_else(|| "1".to_string());
        // Existing members are updated in place unless the caller opts out.
        let replace = match item.options.replace_member.unwrap_or(true) {
            true => Some("T"),
            false => Some("F"),
        };

        Ok(Self {
            merchant_api_id: item.options.require_login()?.clone(),
            password: item.options.require_password()?.clone(),
            action_type: "Add",
            status: MEMBER_STATUS_ACTIVE,
            member_id: item.options.require_customer()?.to_string(),
            first_name,
            last_name,
            member_group_id,
            replace,
            account: item.card.map(|card| card.card_number.clone()),
            exp_year: item.card.map(|card| card.card_exp_year.clone()),
            exp_month: item.card.map(|card| card.card_exp_month.clone()),
            holder_name: item.card.map(|card| card.card_holder_name.clone()),
            acct_status: item.card.map(|_| MEMBER_STATUS_ACTIVE),
            merchant_id: item.options.require_merchant()?.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CardMaintenanceAction {
    Query,
    Delete,
}

/// Member-pay request addressing a stored card by its static token.
#[derive(Debug, Serialize)]
pub struct CardMaintenanceRequest {
    #[serde(rename = "merchantApiId")]
    merchant_api_id: Secret<String>,
    password: Secret<String>,
    #[serde(rename = "actionType")]
    action_type: CardMaintenanceAction,
    #[serde(rename = "staticToken")]
    static_token: Secret<String>,
    #[serde(rename = "memberId", skip_serializing_if = "Option::is_none")]
    member_id: Option<String>,
    #[serde(rename = "merchantId")]
    merchant_id: String,
}

pub struct CardMaintenanceContext<'a> {
    pub action: CardMaintenanceAction,
    pub static_token: &'a Secret<String>,
    pub options: &'a PaymentOptions,
}

impl TryFrom<&CardMaintenanceContext<'_>> for CardMaintenanceRequest {
    type Error = error_stack::Report<PaydollarError>;

    fn try_from(item: &CardMaintenanceContext<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            merchant_api_id: item.options.require_login()?.clone(),
            password: item.options.require_password()?.clone(),
            action_type: item.action,
            static_token: item.static_token.clone(),
            member_id: item.options.customer.clone(),
            merchant_id: item.options.require_merchant()?.to_string(),
        })
    }
}

/// Member-pay request minting a one-time token from a decrypted static token.
#[derive(Debug, Serialize)]
pub struct GenerateTokenRequest {
    #[serde(rename = "merchantApiId")]
    merchant_api_id: Secret<String>,
    password: Secret<String>,
    #[serde(rename = "actionType")]
    action_type: &'static str,
    #[serde(rename = "memberId")]
    member_id: String,
    #[serde(rename = "staticToken")]
    static_token: Secret<String>,
    amount: String,
    #[serde(rename = "merchantId")]
    merchant_id: String,
}

pub struct GenerateTokenContext<'a> {
    pub static_token: &'a Secret<String>,
    pub amount: MinorUnit,
    pub options: &'a PaymentOptions,
}

impl TryFrom<&GenerateTokenContext<'_>> for GenerateTokenRequest {
    type Error = error_stack::Report<PaydollarError>;

    fn try_from(item: &GenerateTokenContext<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            merchant_api_id: item.options.require_login()?.clone(),
            password: item.options.require_password()?.clone(),
            action_type: "GenerateToken",
            member_id: item.options.require_customer()?.to_string(),
            static_token: item.static_token.clone(),
            amount: item.amount.to_major_unit_string(),
            merchant_id: item.options.require_merchant()?.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SchPayAction {
    #[serde(rename = "AddSchPay")]
    Add,
    #[serde(rename = "QuerySchPay")]
    Query,
    #[serde(rename = "SuspendSchPay")]
    Suspend,
    #[serde(rename = "ActivateSchPay")]
    Activate,
    #[serde(rename = "DeleteSchPay")]
    Delete,
}

/// Scheduled-payment creation: a billing schedule with the card it charges.
#[derive(Debug, Serialize)]
pub struct SchPayCreateRequest {
    #[serde(rename = "loginId")]
    login_id: Secret<String>,
    password: Secret<String>,
    #[serde(rename = "actionType")]
    action_type: SchPayAction,
    #[serde(rename = "merchantId")]
    merchant_id: String,
    #[serde(rename = "orderRef", skip_serializing_if = "Option::is_none")]
    order_ref: Option<String>,
    #[serde(rename = "currCode", skip_serializing_if = "Option::is_none")]
    curr_code: Option<Currency>,
    amount: String,
    #[serde(rename = "schType")]
    sch_type: ScheduleType,
    #[serde(rename = "startDay")]
    start_day: String,
    #[serde(rename = "startMonth")]
    start_month: String,
    #[serde(rename = "startYear")]
    start_year: String,
    #[serde(rename = "payTimes")]
    pay_times: String,
    #[serde(rename = "pMethod")]
    p_method: CardBrand,
    #[serde(rename = "epMonth")]
    exp_month: Secret<String>,
    #[serde(rename = "epYear")]
    exp_year: Secret<String>,
    #[serde(rename = "cardNo")]
    card_number: Secret<String>,
    #[serde(rename = "cardHolder")]
    card_holder: Secret<String>,
    #[serde(rename = "securityCode")]
    security_code: Secret<String>,
}

pub struct SchPayCreateContext<'a> {
    pub amount: MinorUnit,
    pub card: &'a Card,
    pub options: &'a PaymentOptions,
}

impl TryFrom<&SchPayCreateContext<'_>> for SchPayCreateRequest {
    type Error = error_stack::Report<PaydollarError>;

    fn try_from(item: &SchPayCreateContext<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            login_id: item.options.require_login()?.clone(),
            password: item.options.require_password()?.clone(),
            action_type: SchPayAction::Add,
            merchant_id: item.options.require_merchant()?.to_string(),
            order_ref: item.options.order_id.clone(),
            curr_code: item.options.currency,
            amount: item.amount.to_major_unit_string(),
            sch_type: item.options.require_schedule_type()?,
            start_day: item.options.require_start_day()?.to_string(),
            start_month: item.options.require_start_month()?.to_string(),
            start_year: item.options.require_start_year()?.to_string(),
            pay_times: item.options.require_pay_times()?.to_string(),
            p_method: item.card.brand,
            exp_month: item.card.card_exp_month.clone(),
            exp_year: item.card.card_exp_year.clone(),
            card_number: item.card.card_number.clone(),
            card_holder: item.card.card_holder_name.clone(),
            security_code: item.card.card_cvc.clone(),
        })
    }
}

/// Scheduled-payment lifecycle call addressing an existing schedule by id.
#[derive(Debug, Serialize)]
pub struct SchPayLifecycleRequest {
    #[serde(rename = "loginId")]
    login_id: Secret<String>,
    password: Secret<String>,
    #[serde(rename = "actionType")]
    action_type: SchPayAction,
    #[serde(rename = "schPayId")]
    sch_pay_id: String,
    #[serde(rename = "merchantId")]
    merchant_id: String,
}

pub struct SchPayLifecycleContext<'a> {
    pub action: SchPayAction,
    pub schedule_id: &'a str,
    pub options: &'a PaymentOptions,
}

impl TryFrom<&SchPayLifecycleContext<'_>> for SchPayLifecycleRequest {
    type Error = error_stack::Report<PaydollarError>;

    fn try_from(item: &SchPayLifecycleContext<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            login_id: item.options.require_login()?.clone(),
            password: item.options.require_password()?.clone(),
            action_type: item.action,
            sch_pay_id: item.schedule_id.to_string(),
            merchant_id: item.options.require_merchant()?.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn card() -> Card {
        Card {
            brand: CardBrand::Visa,
            card_number: Secret::new("4918914107195005".to_string()),
            card_exp_month: Secret::new("07".to_string()),
            card_exp_year: Secret::new("2015".to_string()),
            card_holder_name: Secret::new("Test Holder".to_string()),
            card_cvc: Secret::new("123".to_string()),
        }
    }

    fn options() -> PaymentOptions {
        PaymentOptions {
            merchant: Some("merchantId".to_string()),
            order_id: Some("REF1".to_string()),
            currency: Some(Currency::SGD),
            lang: Some(Language::English),
            ..Default::default()
        }
    }

    #[test]
    fn card_payment_body_carries_the_wire_field_names() {
        let card = card();
        let options = options();
        let request = PaydollarPaymentsRequest::try_from(&CardPaymentContext {
            pay_type: PayType::Normal,
            amount: MinorUnit::new(1000),
            card: &card,
            options: &options,
        })
        .unwrap();
        let body = request.encode().unwrap();

        assert!(body.contains("merchantId=merchantId"));
        assert!(body.contains("orderRef=REF1"));
        assert!(body.contains("currCode=702"));
        assert!(body.contains("amount=10.00"));
        assert!(body.contains("payType=N"));
        assert!(body.contains("lang=E"));
        assert!(body.contains("pMethod=VISA"));
        assert!(body.contains("epMonth=07"));
        assert!(body.contains("epYear=2015"));
        assert!(body.contains("cardNo=4918914107195005"));
        assert!(body.contains("cardHolder=Test+Holder"));
        assert!(body.contains("securityCode=123"));
        assert!(!body.contains("billingFirstName"));
        assert!(!body.contains("secureHash"));
    }

    #[test]
    fn authorize_sends_a_hold_pay_type() {
        let card = card();
        let options = options();
        let request = PaydollarPaymentsRequest::try_from(&CardPaymentContext {
            pay_type: PayType::Hold,
            amount: MinorUnit::new(1000),
            card: &card,
            options: &options,
        })
        .unwrap();
        assert!(request.encode().unwrap().contains("payType=H"));
    }

    #[test]
    fn address_splits_the_holder_name_and_maps_every_field() {
        let card = card();
        let mut options = options();
        options.address = Some(Address {
            name: Some(Secret::new("Test Holder".to_string())),
            street1: Some(Secret::new("Test Address 1".to_string())),
            street2: Some(Secret::new("Test Address 2".to_string())),
            city: Some("Test City".to_string()),
            state: Some("".to_string()),
            postal_code: None,
            country: Some("Test Country".to_string()),
            email: Some(Secret::new("test@example.com".to_string())),
            ip: Some(Secret::new("192.168.180.100".to_string())),
        });
        let request = PaydollarPaymentsRequest::try_from(&CardPaymentContext {
            pay_type: PayType::Normal,
            amount: MinorUnit::new(1000),
            card: &card,
            options: &options,
        })
        .unwrap();
        let body = request.encode().unwrap();

        assert!(body.contains("billingFirstName=Test"));
        assert!(body.contains("billingLastName=Holder"));
        assert!(body.contains("billingStreet1=Test+Address+1"));
        assert!(body.contains("billingStreet2=Test+Address+2"));
        assert!(body.contains("billingCity=Test+City"));
        assert!(body.contains("billingCountry=Test+Country"));
        assert!(body.contains("billingEmail=test%40example.com"));
        assert!(body.contains("custIPAddress=192.168.180.100"));
        assert!(!body.contains("billingPostalCode"));
    }

    #[test]
    fn secure_hash_signs_merchant_order_currency_amount_and_type() {
        let card = card();
        let mut options = options();
        options.secure_hash_secret = Some(Secret::new("secret".to_string()));
        let request = PaydollarPaymentsRequest::try_from(&CardPaymentContext {
            pay_type: PayType::Normal,
            amount: MinorUnit::new(1000),
            card: &card,
            options: &options,
        })
        .unwrap();
        let body = request.encode().unwrap();

        let expected = crypto::secure_hash(
            "merchantId",
            "REF1",
            "702",
            "10.00",
            "N",
            &Secret::new("secret".to_string()),
        );
        assert!(body.contains(&format!("secureHash={expected}")));
    }

    #[test]
    fn member_pay_payment_replaces_card_fields_with_token_fields() {
        let options = options();
        let request = PaydollarPaymentsRequest::try_from(&TokenPaymentContext {
            pay_type: PayType::Normal,
            amount: MinorUnit::new(1000),
            member_id: "member-1",
            one_time_token: Secret::new("OTT123".to_string()),
            options: &options,
        })
        .unwrap();
        let body = request.encode().unwrap();

        assert!(body.contains("memberPay_service=T"));
        assert!(body.contains("memberPay_memberId=member-1"));
        assert!(body.contains("memberPay_token=OTT123"));
        assert!(!body.contains("cardNo"));
    }

    #[test]
    fn capture_carries_amount_but_void_does_not() {
        let options = PaymentOptions {
            merchant: Some("merchantId".to_string()),
            login: Some(Secret::new("loginId".to_string())),
            password: Some(Secret::new("password".to_string())),
            ..Default::default()
        };
        let capture = OrderManagementRequest::try_from(&OrderManagementContext {
            action: OrderAction::Capture,
            authorization: "1296294",
            amount: Some(MinorUnit::new(1000)),
            options: &options,
        })
        .unwrap();
        let body = encode_body(&capture).unwrap();
        assert!(body.contains("loginId=loginId"));
        assert!(body.contains("password=password"));
        assert!(body.contains("actionType=Capture"));
        assert!(body.contains("payRef=1296294"));
        assert!(body.contains("amount=10.00"));

        let void = OrderManagementRequest::try_from(&OrderManagementContext {
            action: OrderAction::Void,
            authorization: "1296294",
            amount: None,
            options: &options,
        })
        .unwrap();
        let body = encode_body(&void).unwrap();
        assert!(body.contains("actionType=Void"));
        assert!(!body.contains("amount="));
    }

    #[test]
    fn store_card_defaults_group_and_replace() {
        let card = card();
        let options = PaymentOptions {
            merchant: Some("merchantId".to_string()),
            login: Some(Secret::new("loginId".to_string())),
            password: Some(Secret::new("password".to_string())),
            customer: Some("customer-1".to_string()),
            name: Some(Secret::new("John Doe".to_string())),
            ..Default::default()
        };
        let request = MembershipRequest::try_from(&MembershipContext {
            card: Some(&card),
            options: &options,
        })
        .unwrap();
        let body = encode_body(&request).unwrap();

        assert!(body.contains("merchantApiId=loginId"));
        assert!(body.contains("actionType=Add"));
        assert!(body.contains("memberId=customer-1"));
        assert!(body.contains("firstName=John"));
        assert!(body.contains("lastName=Doe"));
        assert!(body.contains("memberGroupId=1"));
        assert!(body.contains("replace=T"));
        assert!(body.contains("account=4918914107195005"));
        assert!(body.contains("expYear=2015"));
        assert!(body.contains("expMonth=07"));
        assert!(body.contains("holderName=Test+Holder"));
        assert!(body.contains("acctStatus=A"));
        assert!(body.contains("status=A"));
    }

    #[test]
    fn membership_without_card_omits_account_fields() {
        let options = PaymentOptions {
            merchant: Some("merchantId".to_string()),
            login: Some(Secret::new("loginId".to_string())),
            password: Some(Secret::new("password".to_string())),
            customer: Some("customer-1".to_string()),
            ..Default::default()
        };
        let request = MembershipRequest::try_from(&MembershipContext {
            card: None,
            options: &options,
        })
        .unwrap();
        let body = encode_body(&request).unwrap();
        assert!(!body.contains("account="));
        assert!(!body.contains("acctStatus"));
        assert!(!body.contains("holderName"));
    }

    #[test]
    fn schedule_creation_requires_the_schedule_fields() {
        let card = card();
        let options = PaymentOptions {
            merchant: Some("merchantId".to_string()),
            login: Some(Secret::new("loginId".to_string())),
            password: Some(Secret::new("password".to_string())),
            ..Default::default()
        };
        let err = SchPayCreateRequest::try_from(&SchPayCreateContext {
            amount: MinorUnit::new(1000),
            card: &card,
            options: &options,
        })
        .unwrap_err();
        assert_eq!(
            err.current_context(),
            &PaydollarError::MissingRequiredOption {
                option: "schedule_type"
            }
        );
    }

    #[test]
    fn schedule_creation_serializes_the_schedule() {
        let card = card();
        let options = PaymentOptions {
            merchant: Some("merchantId".to_string()),
            login: Some(Secret::new("loginId".to_string())),
            password: Some(Secret::new("password".to_string())),
            order_id: Some("REF1".to_string()),
            currency: Some(Currency::SGD),
            schedule_type: Some(ScheduleType::Monthly),
            start_day: Some(1),
            start_month: Some(2),
            start_year: Some(2026),
            pay_times: Some(12),
            ..Default::default()
        };
        let request = SchPayCreateRequest::try_from(&SchPayCreateContext {
            amount: MinorUnit::new(1000),
            card: &card,
            options: &options,
        })
        .unwrap();
        let body = encode_body(&request).unwrap();

        assert!(body.contains("actionType=AddSchPay"));
        assert!(body.contains("schType=M"));
        assert!(body.contains("startDay=1"));
        assert!(body.contains("startMonth=2"));
        assert!(body.contains("startYear=2026"));
        assert!(body.contains("payTimes=12"));
        assert!(body.contains("cardNo=4918914107195005"));
    }
}
