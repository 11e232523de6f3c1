//! Core of llm-handoff: a provider abstraction plus a fan-out dispatcher.
//!
//! Backends implement the [`LlmProvider`] trait and are collected into a
//! [`ProviderRegistry`] built once at startup from [`Config`]. The
//! [`Dispatcher`] resolves a named operation to a single provider or to a
//! concurrent fan-out across every registered provider, and folds
//! per-provider failures into readable result text instead of aborting the
//! call.

pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod provider;
pub mod registry;

pub use catalog::{Operation, OperationKind, operation_name, operations};
pub use config::Config;
pub use dispatch::Dispatcher;
pub use error::{DispatchError, ProviderError};
pub use provider::LlmProvider;
pub use registry::ProviderRegistry;
