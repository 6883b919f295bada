//! Request extractors whose rejections are reported as `GatewayError`, so
//! malformed bodies, queries and paths get the standard JSON error envelope.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::GatewayError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(GatewayError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(GatewayError))]
pub struct ApiQuery<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(GatewayError))]
pub struct ApiPath<T>(pub T);
