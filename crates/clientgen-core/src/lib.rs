//! Clientgen Core Library
//!
//! This library turns an OpenAPI 3.1 document into typed API clients: a Go
//! backend client with its tests and DTOs, and a TypeScript client, models and
//! Playwright route mocks for the frontend.

pub mod builders;
pub mod classify;
pub mod config;
pub mod emit;
pub mod error;
pub mod generate;
pub mod ir;
pub mod openapi;
pub mod render;
pub mod schema;
pub mod templates;
pub mod utils;

pub use crate::{
    config::Config,
    error::{Error, Result},
    generate::{generate, GenerationReport, PassReport},
    ir::{OperationIr, TypeDef},
    openapi::OpenApiContext,
    templates::{TemplateDir, TemplateKind, TemplateManager, TemplateOptions},
};
