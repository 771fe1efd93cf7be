//! JSON-RPC message routing
//!
//! Every method goes to `commands::dispatch`; requests get a response,
//! notifications do not.

use serde_json::Value;

use super::{ErrorObject, Notification, Request, Response, INVALID_REQUEST};
use crate::{
    commands,
    errors::{PromptPortError, Result},
    session::Session,
};

/// Parse and route one incoming line
///
/// Returns:
/// - Some(json_response) for requests (must send response)
/// - None for notifications (no response needed)
///
/// Malformed JSON is an `Err(SerdeError)`; the caller answers it with a
/// parse error.
pub fn handle_text(session: &mut Session, text: &str) -> Result<Option<String>> {
    let value: Value = serde_json::from_str(text).map_err(PromptPortError::SerdeError)?;

    let response = if value.get("jsonrpc").is_none() {
        Some(invalid_request(&value, "missing jsonrpc field"))
    } else if value.get("id").is_some() {
        match serde_json::from_value::<Request>(value.clone()) {
            Ok(request) => Some(handle_request(session, request)),
            Err(e) => Some(invalid_request(&value, &e.to_string())),
        }
    } else {
        match serde_json::from_value::<Notification>(value) {
            Ok(notification) => handle_notification(session, notification)?,
            // No id to answer, so a malformed notification is dropped
            Err(e) => log::warn!("Dropping malformed notification: {}", e),
        }
        None
    };

    response
        .map(|response| serde_json::to_string(&response).map_err(PromptPortError::from))
        .transpose()
}

/// Run a request and wrap the outcome
///
/// Command errors become JSON-RPC error responses.
pub fn handle_request(session: &mut Session, req: Request) -> Response {
    match commands::dispatch(session, &req.method, req.params) {
        Ok(value) => Response::success(req.id, value),
        Err(err) => {
            log::warn!("{} failed [{}]: {}", req.method, err.category(), err);
            Response::error(req.id, ErrorObject::from(&err))
        },
    }
}

/// Handle a JSON-RPC notification
///
/// Routes to handlers but does not return a response
pub fn handle_notification(session: &mut Session, notif: Notification) -> Result<()> {
    commands::dispatch(session, &notif.method, notif.params)?;
    Ok(())
}

fn invalid_request(value: &Value, reason: &str) -> Response {
    let id = value
        .get("id")
        .and_then(|id| serde_json::from_value(id.clone()).ok())
        .unwrap_or(super::Id::Null);

    Response::error(
        id,
        ErrorObject {
            code:    INVALID_REQUEST,
            message: format!("Invalid request: {}", reason),
            data:    None,
        },
    )
}
