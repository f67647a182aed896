//! Static routing table from operation to target endpoint.

/// Which of the processor's environments requests are sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Test,
    Live,
}

impl Environment {
    pub fn is_test(&self) -> bool {
        matches!(self, Self::Test)
    }
}

/// Logical gateway operations. Every operation maps to exactly one endpoint
/// family; the match in [`endpoint`] is exhaustive, so an unrouted operation
/// cannot compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    Authorize,
    Purchase,
    Capture,
    Void,
    ReverseAuthorization,
    StoreCard,
    RetrieveCard,
    DeleteCard,
    AddMembership,
    GenerateToken,
    RecurringCreate,
    RecurringStatus,
    RecurringSuspend,
    RecurringReactivate,
    RecurringDelete,
}

const DIRECT_PAY: (&str, &str) = (
    "https://test.paydollar.com/b2cDemo/eng/directPay/payComp.jsp",
    "https://www.paydollar.com/b2c2/eng/directPay/payComp.jsp",
);
const ORDER_API: (&str, &str) = (
    "https://test.paydollar.com/b2cDemo/eng/merchant/api/orderApi.jsp",
    "https://www.paydollar.com/b2c2/eng/merchant/api/orderApi.jsp",
);
const MEMBER_PAY_API: (&str, &str) = (
    "https://test.paydollar.com/b2cDemo/eng/merchant/api/MemberPayApi.jsp",
    "https://www.paydollar.com/b2c2/eng/merchant/api/MemberPayApi.jsp",
);
const MEMBERSHIP_API: (&str, &str) = (
    "https://test.paydollar.com/b2cDemo/eng/merchant/api/MembershipApi.jsp",
    "https://www.paydollar.com/b2c2/eng/merchant/api/MembershipApi.jsp",
);
const SCH_PAY_API: (&str, &str) = (
    "https://test.paydollar.com/b2cDemo/eng/merchant/api/SchPayApi.jsp",
    "https://www.paydollar.com/b2c2/eng/merchant/api/SchPayApi.jsp",
);

/// Resolves the target URL for an operation in the given environment.
pub fn endpoint(operation: Operation, environment: Environment) -> &'static str {
    let (test, live) = match operation {
        Operation::Authorize | Operation::Purchase => DIRECT_PAY,
        Operation::Capture | Operation::Void | Operation::ReverseAuthorization => ORDER_API,
        Operation::RetrieveCard | Operation::DeleteCard | Operation::GenerateToken => {
            MEMBER_PAY_API
        }
        Operation::StoreCard | Operation::AddMembership => MEMBERSHIP_API,
        Operation::RecurringCreate
        | Operation::RecurringStatus
        | Operation::RecurringSuspend
        | Operation::RecurringReactivate
        | Operation::RecurringDelete => SCH_PAY_API,
    };
    match environment {
        Environment::Test => test,
        Environment::Live => live,
    }
}
