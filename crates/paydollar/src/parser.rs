//! Dual-format response parser.
//!
//! The processor answers either with an URL-encoded query string or with XML.
//! The format is decided exactly once, from the stripped raw text, and each
//! format has its own decoder; both normalize into a [`NormalizedResponse`].
//! Business declines are successful parses with `success == false`; only
//! bodies that match neither known shape raise errors.

use std::collections::BTreeMap;

use error_stack::ResultExt;

use crate::errors::{CustomResult, PaydollarError};

/// A parsed response field: a leaf value, a nested element, or a repeated
/// element coerced into a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Map(BTreeMap<String, FieldValue>),
    List(Vec<FieldValue>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            Self::Map(_) | Self::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            Self::List(items) => Some(items),
            Self::Text(_) | Self::Map(_) => None,
        }
    }
}

/// The single result shape every response normalizes into. Constructed once
/// per request/response cycle and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedResponse {
    success: bool,
    message: String,
    fields: BTreeMap<String, FieldValue>,
    authorization: Option<String>,
    test_mode: bool,
}

impl NormalizedResponse {
    pub fn success(&self) -> bool {
        self.success
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// The processor's payment reference, used for later capture/void calls.
    pub fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref()
    }

    pub fn test_mode(&self) -> bool {
        self.test_mode
    }

    /// The static token of a freshly stored card, when the response carries
    /// one.
    pub fn token(&self) -> Option<&str> {
        self.get("statictoken")
            .or_else(|| self.get("token"))
            .and_then(FieldValue::as_text)
    }

    /// The short-lived token minted by a member-pay token-generation call.
    pub fn one_time_token(&self) -> Option<&str> {
        self.get("oneTimeToken")
            .or_else(|| self.get("token"))
            .and_then(FieldValue::as_text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResponseFormat {
    QueryString,
    Xml,
}

// Textual heuristic, not schema validation: a stripped body wrapped in
// angle brackets is treated as XML, anything else as a query string.
fn detect_format(body: &str) -> ResponseFormat {
    let stripped = body.trim();
    if stripped.starts_with('<') && stripped.ends_with('>') {
        ResponseFormat::Xml
    } else {
        ResponseFormat::QueryString
    }
}

/// Parses a raw response body into a [`NormalizedResponse`]. Pure function of
/// its inputs; re-parsing the same body always yields an identical result.
pub fn parse(body: &str, test_mode: bool) -> CustomResult<NormalizedResponse, PaydollarError> {
    let format = detect_format(body);
    tracing::debug!(?format, "classified processor response");
    match format {
        ResponseFormat::QueryString => parse_query(body, test_mode),
        ResponseFormat::Xml => parse_xml(body, test_mode),
    }
}

fn parse_query(body: &str, test_mode: bool) -> CustomResult<NormalizedResponse, PaydollarError> {
    let mut pairs: BTreeMap<String, String> = BTreeMap::new();
    for segment in body.trim().split('&') {
        if segment.is_empty() {
            continue;
        }
        // Values are split on the first `=` and kept verbatim; URL decoding,
        // when needed, is the transport collaborator's job on the way in.
        let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
        pairs.insert(key.to_string(), value.to_string());
    }

    // The two indicators are mutually exclusive per endpoint family:
    // `successcode` on direct-payment responses, `resultCode` on order
    // management. Neither present means the body is not one of ours.
    let success = if let Some(code) = pairs.remove("successcode") {
        code == "0"
    } else if let Some(code) = pairs.remove("resultCode") {
        code == "0"
    } else {
        return Err(PaydollarError::MissingSuccessIndicator)
            .attach_printable(format!("raw response: {body}"));
    };

    let message = pairs
        .remove("errMsg")
        .ok_or(PaydollarError::MissingMessageField)
        .attach_printable_lazy(|| format!("raw response: {body}"))?
        .trim()
        .to_string();

    let authorization = pairs.remove("PayRef");
    let fields = pairs
        .into_iter()
        .map(|(key, value)| (key, FieldValue::Text(value)))
        .collect();

    Ok(NormalizedResponse {
        success,
        message,
        fields,
        authorization,
        test_mode,
    })
}

fn parse_xml(body: &str, test_mode: bool) -> CustomResult<NormalizedResponse, PaydollarError> {
    let document = roxmltree::Document::parse(body.trim())
        .change_context(PaydollarError::XmlParsingFailed)
        .attach_printable_lazy(|| format!("raw response: {body}"))?;
    let root = document.root_element();

    if let Some(master) = root
        .descendants()
        .find(|node| node.is_element() && node.has_tag_name("masterSchPay"))
    {
        return Ok(parse_record_shape(master, test_mode));
    }

    parse_status_shape(root, test_mode)
        .attach_printable_lazy(|| format!("raw response: {body}"))
}

/// Record shape: scheduled-payment queries return the schedule master with
/// its detail records nested under `records/masterSchPay`.
fn parse_record_shape(master: roxmltree::Node<'_, '_>, test_mode: bool) -> NormalizedResponse {
    let mut fields = flatten_children(master);

    // Callers iterate detail records, so a single occurrence still has to be
    // a one-element sequence rather than a bare mapping.
    if let Some(detail) = fields.remove("detailSchPay") {
        let coerced = match detail {
            FieldValue::List(items) => FieldValue::List(items),
            other => FieldValue::List(vec![other]),
        };
        fields.insert("detailSchPay".to_string(), coerced);
    }

    let success = fields.contains_key("detailSchPay");
    let message = if success {
        "Request is successful"
    } else {
        "Request is not successful"
    };

    NormalizedResponse {
        success,
        message: message.to_string(),
        fields,
        authorization: None,
        test_mode,
    }
}

/// Status shape: every other XML response carries a `responsestatus` element
/// with the outcome and a `response` element with the payload.
fn parse_status_shape(
    root: roxmltree::Node<'_, '_>,
    test_mode: bool,
) -> CustomResult<NormalizedResponse, PaydollarError> {
    let status = root
        .descendants()
        .find(|node| node.is_element() && node.has_tag_name("responsestatus"))
        .ok_or(PaydollarError::UnrecognizedResponseShape)
        .attach_printable("neither masterSchPay nor responsestatus present")?;

    let response_code = element_text(status, "responsecode");
    let success = response_code.as_deref() == Some("0");
    let message = element_text(status, "responsemessage").unwrap_or_default();

    let mut fields = root
        .descendants()
        .find(|node| node.is_element() && node.has_tag_name("response"))
        .map(flatten_children)
        .unwrap_or_default();

    // Legacy behavior: only one account is ever meaningful per call, so a
    // repeated `response/account` keeps its first occurrence only.
    if let Some(FieldValue::List(mut accounts)) = fields.remove("account") {
        if !accounts.is_empty() {
            fields.insert("account".to_string(), accounts.swap_remove(0));
        }
    }

    Ok(NormalizedResponse {
        success,
        message,
        fields,
        authorization: None,
        test_mode,
    })
}

fn element_text(parent: roxmltree::Node<'_, '_>, name: &str) -> Option<String> {
    parent
        .children()
        .find(|node| node.is_element() && node.has_tag_name(name))
        .and_then(|node| node.text())
        .map(|text| text.trim().to_string())
}

/// Flattens an element: a leaf becomes its trimmed text (or an empty mapping
/// when blank), an element with children becomes a mapping of child name to
/// recursively flattened value.
fn flatten_element(node: roxmltree::Node<'_, '_>) -> FieldValue {
    let has_element_children = node.children().any(|child| child.is_element());
    if has_element_children {
        FieldValue::Map(flatten_children(node))
    } else {
        match node.text().map(str::trim) {
            Some(text) if !text.is_empty() => FieldValue::Text(text.to_string()),
            _ => FieldValue::Map(BTreeMap::new()),
        }
    }
}

/// Flattens the immediate element children of a node, coercing repeated
/// same-named children into a sequence.
fn flatten_children(node: roxmltree::Node<'_, '_>) -> BTreeMap<String, FieldValue> {
    let mut map: BTreeMap<String, FieldValue> = BTreeMap::new();
    for child in node.children().filter(|child| child.is_element()) {
        let name = child.tag_name().name().to_string();
        let value = flatten_element(child);
        match map.remove(&name) {
            None => {
                map.insert(name, value);
            }
            Some(FieldValue::List(mut items)) => {
                items.push(value);
                map.insert(name, FieldValue::List(items));
            }
            Some(existing) => {
                map.insert(name, FieldValue::List(vec![existing, value]));
            }
        }
    }
    map
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    const SUCCESSFUL_PURCHASE: &str = "successcode=0&Ref=REF1&PayRef=1296297&Amt=10.0&Cur=702&prc=0&src=0&Ord=12345678&Holder=Test Holder&AuthId=296297&TxTime=2013-11-21 12:01:36.0&errMsg=Transaction completed";
    const FAILED_CAPTURE: &str = "resultCode=-1&orderStatus=&ref=&payRef=&amt=&cur=&errMsg=Parameter Payment Reference Number Incorrect.";
    const STORE_CARD_RESPONSE: &str = r#"<membershipresponse>
        <responsestatus>
            <responsecode>0</responsecode>
            <responsemessage>OK</responsemessage>
        </responsestatus>
        <response>
            <statictoken>9556355650441961</statictoken>
        </response>
    </membershipresponse>"#;

    #[test]
    fn successful_query_response_parses() {
        let response = parse(SUCCESSFUL_PURCHASE, true).unwrap();
        assert!(response.success());
        assert_eq!(response.message(), "Transaction completed");
        assert_eq!(response.authorization(), Some("1296297"));
        assert!(response.test_mode());
        assert_eq!(
            response.get("Holder").and_then(FieldValue::as_text),
            Some("Test Holder")
        );
    }

    #[test]
    fn non_zero_result_code_is_a_failure_not_an_error() {
        let response = parse(FAILED_CAPTURE, true).unwrap();
        assert!(!response.success());
        assert_eq!(
            response.message(),
            "Parameter Payment Reference Number Incorrect."
        );
    }

    #[test]
    fn err_msg_is_trimmed() {
        let response = parse("successcode=-1&errMsg=  Authentication Failed  ", false).unwrap();
        assert!(!response.success());
        assert_eq!(response.message(), "Authentication Failed");
        assert!(!response.test_mode());
    }

    #[test]
    fn missing_success_indicators_is_ambiguous() {
        let err = parse("foo=bar&errMsg=whatever", true).unwrap_err();
        assert_eq!(
            err.current_context(),
            &PaydollarError::MissingSuccessIndicator
        );
    }

    #[test]
    fn missing_err_msg_field_is_a_parse_error() {
        let err = parse("successcode=0&PayRef=1", true).unwrap_err();
        assert_eq!(err.current_context(), &PaydollarError::MissingMessageField);
    }

    #[test]
    fn later_duplicate_keys_overwrite_earlier_ones() {
        let response = parse("successcode=0&errMsg=first&errMsg=final", true).unwrap();
        assert_eq!(response.message(), "final");
    }

    #[test]
    fn values_keep_their_raw_encoding() {
        let response = parse("successcode=0&errMsg=OK&Ord=a%3Db&note=x=y", true).unwrap();
        assert_eq!(
            response.get("Ord").and_then(FieldValue::as_text),
            Some("a%3Db")
        );
        // Only the first `=` splits a segment.
        assert_eq!(
            response.get("note").and_then(FieldValue::as_text),
            Some("x=y")
        );
    }

    #[test]
    fn parsing_is_idempotent() {
        let first = parse(SUCCESSFUL_PURCHASE, true).unwrap();
        let second = parse(SUCCESSFUL_PURCHASE, true).unwrap();
        assert_eq!(first, second);

        let first_xml = parse(STORE_CARD_RESPONSE, true).unwrap();
        let second_xml = parse(STORE_CARD_RESPONSE, true).unwrap();
        assert_eq!(first_xml, second_xml);
    }

    #[test]
    fn status_shape_success_carries_the_payload() {
        let response = parse(STORE_CARD_RESPONSE, true).unwrap();
        assert!(response.success());
        assert_eq!(response.message(), "OK");
        assert_eq!(response.token(), Some("9556355650441961"));
    }

    #[test]
    fn status_shape_failure_reports_the_processor_message() {
        let body = r#"<membershipresponse>
            <responsestatus>
                <responsecode>-1</responsecode>
                <responsemessage>Member Not Found</responsemessage>
            </responsestatus>
            <response/>
        </membershipresponse>"#;
        let response = parse(body, false).unwrap();
        assert!(!response.success());
        assert_eq!(response.message(), "Member Not Found");
    }

    #[test]
    fn repeated_account_elements_keep_only_the_first() {
        let body = r#"<memberpayresponse>
            <responsestatus>
                <responsecode>0</responsecode>
                <responsemessage>OK</responsemessage>
            </responsestatus>
            <response>
                <account>
                    <accountId>first</accountId>
                </account>
                <account>
                    <accountId>second</accountId>
                </account>
            </response>
        </memberpayresponse>"#;
        let response = parse(body, true).unwrap();
        let account = response.get("account").unwrap();
        match account {
            FieldValue::Map(map) => assert_eq!(
                map.get("accountId").and_then(FieldValue::as_text),
                Some("first")
            ),
            other => panic!("expected a mapping, got {other:?}"),
        }
    }

    #[test]
    fn blank_leaf_elements_flatten_to_empty_mappings() {
        let body = r#"<membershipresponse>
            <responsestatus>
                <responsecode>0</responsecode>
                <responsemessage>OK</responsemessage>
            </responsestatus>
            <response>
                <statictoken>  </statictoken>
            </response>
        </membershipresponse>"#;
        let response = parse(body, true).unwrap();
        assert_eq!(
            response.get("statictoken"),
            Some(&FieldValue::Map(BTreeMap::new()))
        );
    }

    #[test]
    fn single_detail_record_is_a_one_element_sequence() {
        let body = r#"<schpayresponse>
            <records>
                <masterSchPay>
                    <schPayId>12345</schPayId>
                    <status>Active</status>
                    <detailSchPay>
                        <orderRef>REF1</orderRef>
                        <amount>10.00</amount>
                    </detailSchPay>
                </masterSchPay>
            </records>
        </schpayresponse>"#;
        let response = parse(body, true).unwrap();
        assert!(response.success());
        let details = response.get("detailSchPay").unwrap().as_list().unwrap();
        assert_eq!(details.len(), 1);
        match &details[0] {
            FieldValue::Map(map) => {
                assert_eq!(
                    map.get("orderRef").and_then(FieldValue::as_text),
                    Some("REF1")
                );
            }
            other => panic!("expected a mapping, got {other:?}"),
        }
        assert_eq!(
            response.get("schPayId").and_then(FieldValue::as_text),
            Some("12345")
        );
    }

    #[test]
    fn repeated_detail_records_stay_in_document_order() {
        let body = r#"<schpayresponse>
            <records>
                <masterSchPay>
                    <detailSchPay><seq>1</seq></detailSchPay>
                    <detailSchPay><seq>2</seq></detailSchPay>
                    <detailSchPay><seq>3</seq></detailSchPay>
                </masterSchPay>
            </records>
        </schpayresponse>"#;
        let response = parse(body, true).unwrap();
        let details = response.get("detailSchPay").unwrap().as_list().unwrap();
        let sequence: Vec<_> = details
            .iter()
            .map(|detail| match detail {
                FieldValue::Map(map) => map.get("seq").and_then(FieldValue::as_text).unwrap(),
                other => panic!("expected a mapping, got {other:?}"),
            })
            .collect();
        assert_eq!(sequence, vec!["1", "2", "3"]);
    }

    #[test]
    fn master_without_details_is_a_failure() {
        let body = r#"<schpayresponse>
            <records>
                <masterSchPay>
                    <schPayId>12345</schPayId>
                </masterSchPay>
            </records>
        </schpayresponse>"#;
        let response = parse(body, true).unwrap();
        assert!(!response.success());
        assert_eq!(response.message(), "Request is not successful");
    }

    #[test]
    fn malformed_xml_is_an_xml_parse_error() {
        let err = parse("<membershipresponse><responsestatus>", true).unwrap_err();
        assert_eq!(err.current_context(), &PaydollarError::XmlParsingFailed);
    }

    #[test]
    fn xml_without_a_known_shape_is_rejected() {
        let err = parse("<unrelated><thing>1</thing></unrelated>", true).unwrap_err();
        assert_eq!(
            err.current_context(),
            &PaydollarError::UnrecognizedResponseShape
        );
    }
}
