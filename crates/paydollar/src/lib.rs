//! Protocol client for the PayDollar payment gateway.
//!
//! Builds form-encoded requests for direct payments, order management,
//! member-pay (stored cards and one-time tokens), membership and scheduled
//! payments, and normalizes the processor's two response formats
//! (URL-encoded query string or XML) into a single [`NormalizedResponse`].
//!
//! HTTP transport is a collaborator behind the [`Transport`] trait; this
//! crate performs no I/O of its own and never retries.

pub mod crypto;
pub mod endpoints;
pub mod errors;
pub mod gateway;
pub mod options;
pub mod parser;
pub mod transformers;
pub mod types;

pub use crate::{
    endpoints::{Environment, Operation},
    errors::{CustomResult, PaydollarError},
    gateway::{Paydollar, PaydollarConfig, Transport},
    options::{PaymentOptions, ScheduleType},
    parser::{FieldValue, NormalizedResponse},
    types::{Address, Card, CardBrand, Currency, Language, MinorUnit, PaymentSource},
};
