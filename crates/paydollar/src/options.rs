//! Per-call options and the pure merge with gateway-level defaults.

use masking::Secret;
use serde::Serialize;

use crate::{
    errors::{CustomResult, PaydollarError},
    types::{Address, Currency, Language},
};

/// Recurrence interval for scheduled payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScheduleType {
    #[serde(rename = "D")]
    Daily,
    #[serde(rename = "W")]
    Weekly,
    #[serde(rename = "M")]
    Monthly,
    #[serde(rename = "Y")]
    Yearly,
}

/// Options recognized by the gateway operations. Absent keys are silently
/// omitted from the wire request unless an operation names them as required.
#[derive(Debug, Clone, Default)]
pub struct PaymentOptions {
    pub order_id: Option<String>,
    pub currency: Option<Currency>,
    pub lang: Option<Language>,
    /// Member id in the processor's member-pay subsystem.
    pub customer: Option<String>,
    /// Member holder name, split into first/last on the wire.
    pub name: Option<Secret<String>>,
    pub member_group: Option<String>,
    /// Replace the member's card details if the member already exists.
    pub replace_member: Option<bool>,
    pub merchant: Option<String>,
    pub login: Option<Secret<String>>,
    pub password: Option<Secret<String>>,
    pub secure_hash_secret: Option<Secret<String>>,
    pub decrypt_key: Option<Secret<String>>,
    pub decrypt_salt: Option<Secret<String>>,
    pub address: Option<Address>,
    pub schedule_type: Option<ScheduleType>,
    pub start_day: Option<u8>,
    pub start_month: Option<u8>,
    pub start_year: Option<u16>,
    /// Number of recurrences for a new schedule.
    pub pay_times: Option<u32>,
}

macro_rules! merge_field {
    ($self:ident, $defaults:ident, $($field:ident),+ $(,)?) => {
        PaymentOptions {
            $($field: $self.$field.clone().or_else(|| $defaults.$field.clone()),)+
        }
    };
}

impl PaymentOptions {
    /// Produces a new options value with gateway defaults filled in beneath
    /// the call-site values. Call-site values win on conflict; neither input
    /// is mutated.
    pub fn merged_with(&self, defaults: &Self) -> Self {
        merge_field!(
            self,
            defaults,
            order_id,
            currency,
            lang,
            customer,
            name,
            member_group,
            replace_member,
            merchant,
            login,
            password,
            secure_hash_secret,
            decrypt_key,
            decrypt_salt,
            address,
            schedule_type,
            start_day,
            start_month,
            start_year,
            pay_times,
        )
    }

    pub(crate) fn require_merchant(&self) -> CustomResult<&str, PaydollarError> {
        self.merchant
            .as_deref()
            .ok_or_else(|| PaydollarError::MissingRequiredOption { option: "merchant" }.into())
    }

    pub(crate) fn require_login(&self) -> CustomResult<&Secret<String>, PaydollarError> {
        self.login
            .as_ref()
            .ok_or_else(|| PaydollarError::MissingRequiredOption { option: "login" }.into())
    }

    pub(crate) fn require_password(&self) -> CustomResult<&Secret<String>, PaydollarError> {
        self.password
            .as_ref()
            .ok_or_else(|| PaydollarError::MissingRequiredOption { option: "password" }.into())
    }

    pub(crate) fn require_customer(&self) -> CustomResult<&str, PaydollarError> {
        self.customer
            .as_deref()
            .ok_or_else(|| PaydollarError::MissingRequiredOption { option: "customer" }.into())
    }

    pub(crate) fn require_decrypt_key(&self) -> CustomResult<&Secret<String>, PaydollarError> {
        self.decrypt_key.as_ref().ok_or_else(|| {
            PaydollarError::MissingRequiredOption {
                option: "decrypt_key",
            }
            .into()
        })
    }

    pub(crate) fn require_decrypt_salt(&self) -> CustomResult<&Secret<String>, PaydollarError> {
        self.decrypt_salt.as_ref().ok_or_else(|| {
            PaydollarError::MissingRequiredOption {
                option: "decrypt_salt",
            }
            .into()
        })
    }

    pub(crate) fn require_schedule_type(&self) -> CustomResult<ScheduleType, PaydollarError> {
        self.schedule_type.ok_or_else(|| {
            PaydollarError::MissingRequiredOption {
                option: "schedule_type",
            }
            .into()
        })
    }

    pub(crate) fn require_start_day(&self) -> CustomResult<u8, PaydollarError> {
        self.start_day
            .ok_or_else(|| PaydollarError::MissingRequiredOption { option: "start_day" }.into())
    }

    pub(crate) fn require_start_month(&self) -> CustomResult<u8, PaydollarError> {
        self.start_month.ok_or_else(|| {
            PaydollarError::MissingRequiredOption {
                option: "start_month",
            }
            .into()
        })
    }

    pub(crate) fn require_start_year(&self) -> CustomResult<u16, PaydollarError> {
        self.start_year.ok_or_else(|| {
            PaydollarError::MissingRequiredOption {
                option: "start_year",
            }
            .into()
        })
    }

    pub(crate) fn require_pay_times(&self) -> CustomResult<u32, PaydollarError> {
        self.pay_times
            .ok_or_else(|| PaydollarError::MissingRequiredOption { option: "pay_times" }.into())
    }
}
