//! Credential check through an inquiry for an order that cannot exist

use crate::infrastructure::adapters::gateway_transport::{GatewayHttpResponse, TransportError};
use crate::infrastructure::gateways::worldpay::response::parse_reply;
use crate::shared::error::{AppError, AppResult};

/// Order not found: the gateway accepted the credentials and looked
const ORDER_NOT_FOUND: &str = "5";
/// Security violation: credentials or merchant code rejected
const SECURITY_VIOLATION: &str = "4";

/// Map the inquiry result onto a credentials verdict
pub fn interpret_credentials_check(result: Result<GatewayHttpResponse, TransportError>) -> AppResult<bool> {
    let response = match result {
        Ok(response) => response,
        Err(TransportError::Status { status: 401, .. }) => return Ok(false),
        Err(error) => return Err(unexpected(error.to_string())),
    };

    let reply = parse_reply(&response.body).map_err(|e| unexpected(e.message))?;
    let error = reply
        .error
        .or_else(|| reply.order_status.and_then(|status| status.error));

    match error.as_ref().and_then(|e| e.code.as_deref()).map(str::trim) {
        Some(ORDER_NOT_FOUND) => Ok(true),
        Some(SECURITY_VIOLATION) => Ok(false),
        Some(code) => Err(unexpected(format!("error code {}", code))),
        None => Err(unexpected("reply carried no error code".to_string())),
    }
}

fn unexpected(detail: String) -> AppError {
    AppError::UnexpectedResponse {
        gateway: "worldpay".to_string(),
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fixtures;

    fn ok(body: String) -> Result<GatewayHttpResponse, TransportError> {
        Ok(GatewayHttpResponse {
            status: 200,
            body,
            cookies: Vec::new(),
        })
    }

    #[test]
    fn test_order_not_found_means_valid() {
        assert_eq!(interpret_credentials_check(ok(fixtures::order_error_reply("x", "5", "Could not find payment for order"))), Ok(true));
        assert_eq!(interpret_credentials_check(ok(fixtures::reply_error("5", "Order not found"))), Ok(true));
    }

    #[test]
    fn test_security_violation_means_invalid() {
        assert_eq!(interpret_credentials_check(ok(fixtures::reply_error("4", "Security violation"))), Ok(false));
    }

    #[test]
    fn test_unauthorised_means_invalid() {
        let result = Err(TransportError::Status {
            status: 401,
            body: String::new(),
        });
        assert_eq!(interpret_credentials_check(result), Ok(false));
    }

    #[test]
    fn test_anything_else_is_unexpected() {
        assert!(matches!(
            interpret_credentials_check(ok(fixtures::reply_error("2", "Invalid XML"))),
            Err(AppError::UnexpectedResponse { .. })
        ));
        assert!(matches!(
            interpret_credentials_check(ok(fixtures::authorised_reply("x"))),
            Err(AppError::UnexpectedResponse { .. })
        ));
        assert!(matches!(
            interpret_credentials_check(Err(TransportError::Status { status: 500, body: String::new() })),
            Err(AppError::UnexpectedResponse { .. })
        ));
        assert!(matches!(
            interpret_credentials_check(Err(TransportError::Timeout("slow".to_string()))),
            Err(AppError::UnexpectedResponse { .. })
        ));
    }
}
