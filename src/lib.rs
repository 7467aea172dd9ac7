//! OAuth 2.0 client-credentials helper that caches bearer tokens, collapses concurrent refreshes
//! into a single token-endpoint call, and attaches the current token to outgoing HTTP requests.
//!
//! The [`client::Client`] reads the configured [`cache::TokenCache`], reuses the cached token
//! while it is still valid (minus a soft-expiry toleration window), and otherwise fetches a new
//! one through the [`flight::FlightGroup`] coordinator. When the resource server rejects a
//! token, the cache is invalidated so the next request fetches a fresh one.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod cache;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod flight;
pub mod http;
pub mod obs;
pub mod parse;
pub mod token;

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		hash::Hash,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::OnceCell;
	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};

	pub use crate::error::{Error, Result};
}

pub use client::Client;
pub use config::ClientConfig;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use token::Token;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
