use crate::error::AppError;
use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use serde::de::DeserializeOwned;

/// A request body bound to `T`, decoded according to its `Content-Type`:
/// `application/x-www-form-urlencoded` goes through [`Form`], anything else
/// through [`Json`]. Both failure paths become [`AppError::Binding`].
#[derive(Debug, Clone)]
pub struct Payload<T>(pub T);

fn is_form(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/x-www-form-urlencoded"))
}

#[async_trait]
impl<S, T> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&request) {
            let Form(value) = Form::<T>::from_request(request, state).await?;
            Ok(Payload(value))
        } else {
            let Json(value) = Json::<T>::from_request(request, state).await?;
            Ok(Payload(value))
        }
    }
}
