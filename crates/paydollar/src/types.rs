//! Typed inputs for the protocol layer: amounts, payment sources, addresses
//! and the processor's static code tables.

use masking::Secret;
use serde::Serialize;

/// An amount in the currency's minor unit. This is the canonical
/// representation everywhere inside the crate; conversion to the major-unit
/// decimal string the processor expects happens once, at the wire boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinorUnit(i64);

impl MinorUnit {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get_amount_as_i64(&self) -> i64 {
        self.0
    }

    /// Major-unit decimal string with two fraction digits. All currencies the
    /// processor supports carry exponent 2.
    pub fn to_major_unit_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

/// Currencies the processor accepts, transmitted as ISO 4217 numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Currency {
    #[serde(rename = "036")]
    AUD,
    #[serde(rename = "124")]
    CAD,
    #[serde(rename = "156")]
    CNY,
    #[serde(rename = "978")]
    EUR,
    #[serde(rename = "826")]
    GBP,
    #[serde(rename = "344")]
    HKD,
    #[serde(rename = "392")]
    JPY,
    #[serde(rename = "458")]
    MYR,
    #[serde(rename = "608")]
    PHP,
    #[serde(rename = "702")]
    SGD,
    #[serde(rename = "764")]
    THB,
    #[serde(rename = "901")]
    TWD,
    #[serde(rename = "840")]
    USD,
}

impl Currency {
    pub fn numeric_code(&self) -> &'static str {
        match self {
            Self::AUD => "036",
            Self::CAD => "124",
            Self::CNY => "156",
            Self::EUR => "978",
            Self::GBP => "826",
            Self::HKD => "344",
            Self::JPY => "392",
            Self::MYR => "458",
            Self::PHP => "608",
            Self::SGD => "702",
            Self::THB => "764",
            Self::TWD => "901",
            Self::USD => "840",
        }
    }
}

/// Page languages, transmitted as the processor's single-letter codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Language {
    #[serde(rename = "C")]
    TraditionalChinese,
    #[serde(rename = "E")]
    English,
    #[serde(rename = "F")]
    French,
    #[serde(rename = "J")]
    Japanese,
    #[serde(rename = "K")]
    Korean,
    #[serde(rename = "T")]
    Thai,
    #[serde(rename = "X")]
    SimplifiedChinese,
}

/// Card networks accepted by the direct-payment endpoint. The direct-payment
/// family always transmits the brand uppercased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CardBrand {
    #[serde(rename = "AMEX")]
    AmericanExpress,
    #[serde(rename = "DINERS")]
    DinersClub,
    #[serde(rename = "JCB")]
    Jcb,
    #[serde(rename = "MASTER")]
    Master,
    #[serde(rename = "VISA")]
    Visa,
}

/// Raw card details. Expiry fields are kept as the strings the caller
/// supplies (`"07"`, `"2025"`); the processor accepts both padded and
/// unpadded months.
#[derive(Debug, Clone)]
pub struct Card {
    pub brand: CardBrand,
    pub card_number: Secret<String>,
    pub card_exp_month: Secret<String>,
    pub card_exp_year: Secret<String>,
    pub card_holder_name: Secret<String>,
    pub card_cvc: Secret<String>,
}

/// What funds a payment: raw card details, or an encrypted static token
/// referencing a card previously stored through the member-pay subsystem.
#[derive(Debug, Clone)]
pub enum PaymentSource {
    Card(Card),
    StoredToken(Secret<String>),
}

/// Billing address. Every field is independently optional; absent fields are
/// omitted from the wire request.
#[derive(Debug, Clone, Default)]
pub struct Address {
    pub name: Option<Secret<String>>,
    pub street1: Option<Secret<String>>,
    pub street2: Option<Secret<String>>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<Secret<String>>,
    pub country: Option<String>,
    pub email: Option<Secret<String>>,
    pub ip: Option<Secret<String>>,
}

/// Splits a holder name at the first space: the first token is the first
/// name, the remainder joined by spaces is the last name. A single-word name
/// yields no last name.
pub(crate) fn split_name(name: &str) -> (String, Option<String>) {
    match name.split_once(' ') {
        Some((first, rest)) if !rest.trim().is_empty() => {
            (first.to_string(), Some(rest.trim().to_string()))
        }
        Some((first, _)) => (first.to_string(), None),
        None => (name.to_string(), None),
    }
}
