//! HTTP route handlers.
//!
//! Handlers take their extractors as `Result`s so malformed paths, queries and
//! bodies are answered with the gateway's JSON error body.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};

pub mod actions;
pub mod health;
pub mod resources;

pub(crate) type JsonBody<T> = Result<Json<T>, JsonRejection>;
pub(crate) type PathParams<T> = Result<Path<T>, PathRejection>;
pub(crate) type QueryParams<T> = Result<Query<T>, QueryRejection>;
