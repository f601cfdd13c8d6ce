//! Request extractors that reject through [`AppError`].
//!
//! Axum's stock `Json`, `Query` and `Path` extractors answer malformed input
//! with plain-text bodies. These wrappers keep the `{"errors": [...]}` shape
//! for every 400 the API returns.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
