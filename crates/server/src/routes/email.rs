use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::info;

use service::mail::{Attachment, OutgoingEmail};

use crate::errors::JsonApiError;
use crate::extract::ApiJson;
use crate::routes::auth::ServerState;
use crate::routes::documents::read_multipart;

#[utoipa::path(post, path = "/api/email/send", tag = "email", request_body = crate::openapi::EmailRequestDoc, responses((status = 200, description = "Sent"), (status = 500, description = "Mail not configured or relay failed")))]
pub async fn send(State(state): State<ServerState>, ApiJson(email): ApiJson<OutgoingEmail>) -> Result<Json<&'static str>, JsonApiError> {
    let to = email.to.clone();
    state.mailer.send(email).await?;
    info!(%to, "email_sent");
    Ok(Json("Email sent successfully"))
}

/// Multipart form with `to`, `subject`, `text` and any number of `files`.
#[utoipa::path(post, path = "/api/email/send-multipart", tag = "email", responses((status = 200, description = "Sent"), (status = 400, description = "Missing field")))]
pub async fn send_multipart(State(state): State<ServerState>, multipart: Multipart) -> Result<Json<&'static str>, JsonApiError> {
    let (files, fields) = read_multipart(multipart, "files").await?;
    let field = |name: &str| {
        fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| JsonApiError::bad_request(format!("{name} is required")))
    };
    let email = OutgoingEmail {
        to: field("to")?,
        subject: field("subject")?,
        text: field("text")?,
        attachments: files
            .into_iter()
            .filter(|f| !f.bytes.is_empty())
            .map(|f| Attachment {
                file_name: f.file_name,
                content_type: f.content_type.unwrap_or_else(|| "application/octet-stream".into()),
                bytes: f.bytes,
            })
            .collect(),
    };
    let (to, attachments) = (email.to.clone(), email.attachments.len());
    state.mailer.send(email).await?;
    info!(%to, attachments, "email_sent");
    Ok(Json("Email sent successfully"))
}
