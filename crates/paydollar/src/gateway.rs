//! The gateway facade: merges options, builds requests through the
//! transformers, posts them through the transport collaborator and hands the
//! raw body to the parser. No field-level or parsing logic lives here.

use error_stack::ResultExt;
use masking::{PeekInterface, Secret};

use crate::{
    crypto,
    endpoints::{self, Environment, Operation},
    errors::{CustomResult, PaydollarError},
    options::PaymentOptions,
    parser::{self, NormalizedResponse},
    transformers::{
        encode_body, CardMaintenanceAction, CardMaintenanceContext, CardMaintenanceRequest,
        CardPaymentContext, GenerateTokenContext, GenerateTokenRequest, MembershipContext,
        MembershipRequest, OrderAction, OrderManagementContext, OrderManagementRequest, PayType,
        PaydollarPaymentsRequest, SchPayAction, SchPayCreateContext, SchPayCreateRequest,
        SchPayLifecycleContext, SchPayLifecycleRequest, TokenPaymentContext,
    },
    types::{Card, MinorUnit, PaymentSource},
};

/// HTTP transport collaborator. Implementations own TLS, timeouts and any
/// retry policy; this layer never retries.
pub trait Transport {
    fn post(&self, url: &str, body: &str) -> CustomResult<String, PaydollarError>;
}

/// Immutable gateway configuration, constructed once per client instance.
#[derive(Debug, Clone)]
pub struct PaydollarConfig {
    pub merchant: String,
    pub login: Option<Secret<String>>,
    pub password: Option<Secret<String>>,
    pub secure_hash_secret: Option<Secret<String>>,
    pub decrypt_key: Option<Secret<String>>,
    pub decrypt_salt: Option<Secret<String>>,
    pub environment: Environment,
}

impl PaydollarConfig {
    fn as_default_options(&self) -> PaymentOptions {
        PaymentOptions {
            merchant: Some(self.merchant.clone()),
            login: self.login.clone(),
            password: self.password.clone(),
            secure_hash_secret: self.secure_hash_secret.clone(),
            decrypt_key: self.decrypt_key.clone(),
            decrypt_salt: self.decrypt_salt.clone(),
            ..Default::default()
        }
    }
}

/// The PayDollar gateway client. Each operation is one logical call that
/// performs one network round trip, except stored-token payments which chain
/// the token mint and the payment into two.
pub struct Paydollar<T: Transport> {
    config: PaydollarConfig,
    defaults: PaymentOptions,
    transport: T,
}

impl<T: Transport> Paydollar<T> {
    pub fn new(config: PaydollarConfig, transport: T) -> Self {
        let defaults = config.as_default_options();
        Self {
            config,
            defaults,
            transport,
        }
    }

    /// Places a hold on the card or stored token for a later capture.
    pub fn authorize(
        &self,
        amount: MinorUnit,
        source: &PaymentSource,
        options: &PaymentOptions,
    ) -> CustomResult<NormalizedResponse, PaydollarError> {
        self.pay(Operation::Authorize, PayType::Hold, amount, source, options)
    }

    /// Settles immediately.
    pub fn purchase(
        &self,
        amount: MinorUnit,
        source: &PaymentSource,
        options: &PaymentOptions,
    ) -> CustomResult<NormalizedResponse, PaydollarError> {
        self.pay(
            Operation::Purchase,
            PayType::Normal,
            amount,
            source,
            options,
        )
    }

    pub fn capture(
        &self,
        amount: MinorUnit,
        authorization: &str,
        options: &PaymentOptions,
    ) -> CustomResult<NormalizedResponse, PaydollarError> {
        self.order_management(
            Operation::Capture,
            OrderAction::Capture,
            authorization,
            Some(amount),
            options,
        )
    }

    pub fn void(
        &self,
        authorization: &str,
        options: &PaymentOptions,
    ) -> CustomResult<NormalizedResponse, PaydollarError> {
        self.order_management(Operation::Void, OrderAction::Void, authorization, None, options)
    }

    pub fn reverse_authorization(
        &self,
        authorization: &str,
        options: &PaymentOptions,
    ) -> CustomResult<NormalizedResponse, PaydollarError> {
        self.order_management(
            Operation::ReverseAuthorization,
            OrderAction::Reverse,
            authorization,
            None,
            options,
        )
    }

    /// Stores a card against a member; the response carries the static token
    /// referencing it.
    pub fn store_card(
        &self,
        card: &Card,
        options: &PaymentOptions,
    ) -> CustomResult<NormalizedResponse, PaydollarError> {
        let options = options.merged_with(&self.defaults);
        let request = MembershipRequest::try_from(&MembershipContext {
            card: Some(card),
            options: &options,
        })?;
        self.commit(Operation::StoreCard, &encode_body(&request)?)
    }

    pub fn delete_card(
        &self,
        static_token: &Secret<String>,
        options: &PaymentOptions,
    ) -> CustomResult<NormalizedResponse, PaydollarError> {
        self.card_maintenance(
            Operation::DeleteCard,
            CardMaintenanceAction::Delete,
            static_token,
            options,
        )
    }

    pub fn retrieve_card(
        &self,
        static_token: &Secret<String>,
        options: &PaymentOptions,
    ) -> CustomResult<NormalizedResponse, PaydollarError> {
        self.card_maintenance(
            Operation::RetrieveCard,
            CardMaintenanceAction::Query,
            static_token,
            options,
        )
    }

    /// Creates a member without storing card details.
    pub fn add_membership(
        &self,
        options: &PaymentOptions,
    ) -> CustomResult<NormalizedResponse, PaydollarError> {
        let options = options.merged_with(&self.defaults);
        let request = MembershipRequest::try_from(&MembershipContext {
            card: None,
            options: &options,
        })?;
        self.commit(Operation::AddMembership, &encode_body(&request)?)
    }

    /// Mints a short-lived one-time token from a decrypted static token; the
    /// response carries it for a single token-based payment.
    pub fn generate_one_time_token(
        &self,
        static_token: &Secret<String>,
        amount: MinorUnit,
        options: &PaymentOptions,
    ) -> CustomResult<NormalizedResponse, PaydollarError> {
        let options = options.merged_with(&self.defaults);
        self.mint_one_time_token(static_token, amount, &options)
    }

    /// Creates a recurring billing schedule charging the given card.
    pub fn recurring(
        &self,
        amount: MinorUnit,
        card: &Card,
        options: &PaymentOptions,
    ) -> CustomResult<NormalizedResponse, PaydollarError> {
        let options = options.merged_with(&self.defaults);
        let request = SchPayCreateRequest::try_from(&SchPayCreateContext {
            amount,
            card,
            options: &options,
        })?;
        self.commit(Operation::RecurringCreate, &encode_body(&request)?)
    }

    pub fn status_recurring(
        &self,
        schedule_id: &str,
        options: &PaymentOptions,
    ) -> CustomResult<NormalizedResponse, PaydollarError> {
        self.recurring_lifecycle(Operation::RecurringStatus, SchPayAction::Query, schedule_id, options)
    }

    pub fn reactivate_recurring(
        &self,
        schedule_id: &str,
        options: &PaymentOptions,
    ) -> CustomResult<NormalizedResponse, PaydollarError> {
        self.recurring_lifecycle(
            Operation::RecurringReactivate,
            SchPayAction::Activate,
            schedule_id,
            options,
        )
    }

    /// Suspends a schedule; it can be resumed with
    /// [`reactivate_recurring`](Self::reactivate_recurring).
    pub fn cancel_recurring(
        &self,
        schedule_id: &str,
        options: &PaymentOptions,
    ) -> CustomResult<NormalizedResponse, PaydollarError> {
        self.recurring_lifecycle(
            Operation::RecurringSuspend,
            SchPayAction::Suspend,
            schedule_id,
            options,
        )
    }

    pub fn delete_recurring(
        &self,
        schedule_id: &str,
        options: &PaymentOptions,
    ) -> CustomResult<NormalizedResponse, PaydollarError> {
        self.recurring_lifecycle(
            Operation::RecurringDelete,
            SchPayAction::Delete,
            schedule_id,
            options,
        )
    }

    fn pay(
        &self,
        operation: Operation,
        pay_type: PayType,
        amount: MinorUnit,
        source: &PaymentSource,
        options: &PaymentOptions,
    ) -> CustomResult<NormalizedResponse, PaydollarError> {
        let options = options.merged_with(&self.defaults);
        let request = match source {
            PaymentSource::Card(card) => PaydollarPaymentsRequest::try_from(&CardPaymentContext {
                pay_type,
                amount,
                card,
                options: &options,
            })?,
            PaymentSource::StoredToken(encrypted) => {
                // Two physical round trips behind one logical call: decrypt
                // the static token, mint a one-time token, then pay with it.
                let member_id = options.require_customer()?.to_string();
                let static_token = crypto::decrypt_static_token(
                    encrypted.peek(),
                    options.require_decrypt_key()?,
                    options.require_decrypt_salt()?,
                )?;
                let minted = self.mint_one_time_token(&static_token, amount, &options)?;
                if !minted.success() {
                    // A processor decline on the mint step is the caller's
                    // answer, not a protocol error.
                    return Ok(minted);
                }
                let one_time_token = minted
                    .one_time_token()
                    .ok_or(PaydollarError::MissingOneTimeToken)?
                    .to_string();
                PaydollarPaymentsRequest::try_from(&TokenPaymentContext {
                    pay_type,
                    amount,
                    member_id: &member_id,
                    one_time_token: Secret::new(one_time_token),
                    options: &options,
                })?
            }
        };
        self.commit(operation, &request.encode()?)
    }

    fn mint_one_time_token(
        &self,
        static_token: &Secret<String>,
        amount: MinorUnit,
        options: &PaymentOptions,
    ) -> CustomResult<NormalizedResponse, PaydollarError> {
        let request = GenerateTokenRequest::try_from(&GenerateTokenContext {
            static_token,
            amount,
            options,
        })?;
        self.commit(Operation::GenerateToken, &encode_body(&request)?)
    }

    fn order_management(
        &self,
        operation: Operation,
        action: OrderAction,
        authorization: &str,
        amount: Option<MinorUnit>,
        options: &PaymentOptions,
    ) -> CustomResult<NormalizedResponse, PaydollarError> {
        let options = options.merged_with(&self.defaults);
        let request = OrderManagementRequest::try_from(&OrderManagementContext {
            action,
            authorization,
            amount,
            options: &options,
        })?;
        self.commit(operation, &encode_body(&request)?)
    }

    fn card_maintenance(
        &self,
        operation: Operation,
        action: CardMaintenanceAction,
        static_token: &Secret<String>,
        options: &PaymentOptions,
    ) -> CustomResult<NormalizedResponse, PaydollarError> {
        let options = options.merged_with(&self.defaults);
        let request = CardMaintenanceRequest::try_from(&CardMaintenanceContext {
            action,
            static_token,
            options: &options,
        })?;
        self.commit(operation, &encode_body(&request)?)
    }

    fn recurring_lifecycle(
        &self,
        operation: Operation,
        action: SchPayAction,
        schedule_id: &str,
        options: &PaymentOptions,
    ) -> CustomResult<NormalizedResponse, PaydollarError> {
        let options = options.merged_with(&self.defaults);
        let request = SchPayLifecycleRequest::try_from(&SchPayLifecycleContext {
            action,
            schedule_id,
            options: &options,
        })?;
        self.commit(operation, &encode_body(&request)?)
    }

    fn commit(
        &self,
        operation: Operation,
        body: &str,
    ) -> CustomResult<NormalizedResponse, PaydollarError> {
        let url = endpoints::endpoint(operation, self.config.environment);
        tracing::debug!(%operation, url, "posting request to processor");
        let raw = self
            .transport
            .post(url, body)
            .attach_printable_lazy(|| format!("operation: {operation}"))?;
        parser::parse(&raw, self.config.environment.is_test())
    }
}
