// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the Sensibo library.
//!
//! This module provides the error hierarchy for the library: transport
//! failures against the cloud API, response parsing, device field support,
//! subscription management, and value validation.

use thiserror::Error;

use crate::subscription::SubscriptionId;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred while talking to the cloud API.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing an API response.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The device or its active mode does not support the request.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    /// A subscription could not be created or removed.
    #[error("subscription error: {0}")]
    Subscription(#[from] SubscriptionError),

    /// A value failed validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// No pod with the given name exists on the account.
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    /// The background poll task terminated abnormally.
    #[error("poll task failed: {0}")]
    PollTaskFailed(String),
}

/// Errors related to value validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// The poll interval must be greater than zero.
    #[error("poll interval must be greater than zero")]
    InvalidInterval,

    /// The string does not name a temperature unit.
    #[error("invalid temperature unit: {0}")]
    InvalidTemperatureUnit(String),
}

/// Transport errors from the cloud API.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("HTTP {status} - {reason}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The canonical reason phrase.
        reason: String,
    },

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The API key was rejected.
    #[error("authentication failed")]
    AuthenticationFailed,
}

/// Errors related to parsing API responses.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the response.
    #[error("missing field in response: {0}")]
    MissingField(String),

    /// Unexpected response format.
    #[error("unexpected response format: {0}")]
    UnexpectedFormat(String),
}

/// Errors related to device fields and modes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The field is not available for the device or its active mode.
    #[error("{field} is not available for this device or mode")]
    UnsupportedField {
        /// The field that is unavailable.
        field: String,
    },

    /// The value is not one of the values supported by the active mode.
    #[error("{value} is not a supported value for {field}")]
    UnsupportedValue {
        /// The field being set.
        field: String,
        /// The rejected value.
        value: String,
    },

    /// The device does not offer the named mode.
    #[error("unknown mode: {0}")]
    UnknownMode(String),
}

impl DeviceError {
    /// Creates an [`DeviceError::UnsupportedField`] for the named field.
    #[must_use]
    pub fn unsupported(field: impl Into<String>) -> Self {
        Self::UnsupportedField {
            field: field.into(),
        }
    }
}

/// Errors related to event subscriptions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The subscription pattern is malformed.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Why the pattern was rejected.
        reason: &'static str,
    },

    /// No subscription exists with this id.
    #[error("unknown subscription: {0}")]
    UnknownSubscription(SubscriptionId),

    /// The property name cannot be bound at this level.
    #[error("invalid property: {0}")]
    InvalidProperty(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
