/*
    Copyright 2025 MydriaTech AB

    Licensed under the Apache License 2.0 with Free world makers exception
    1.0.0 (the "License"); you may not use this file except in compliance with
    the License. You should have obtained a copy of the License with the source
    or binary distribution in file named

        LICENSE-Apache-2.0-with-FWM-Exception-1.0.0

    Unless required by applicable law or agreed to in writing, software
    distributed under the License is distributed on an "AS IS" BASIS,
    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
    See the License for the specific language governing permissions and
    limitations under the License.
*/

//! Telemetry service errors.

use std::error::Error;
use std::fmt;

/// Cause of error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryErrorKind {
    /// General failure. See message for details.
    Unspecified,
    /// Malformed request input. E.g. an unparsable URL or client identifier.
    InvalidInput,
    /// Client credentials did not check out.
    Unauthorized,
    /// The requested record does not exist.
    NotFound,
    /// Another live lease already holds the requested node id.
    LeaseConflict,
    /// The lease row is gone or lapsed. The holder must re-acquire.
    LeaseLost,
    /// The wall clock is outside the generator's active window.
    WindowExpired,
    /// The connectivity probe returned something other than its echo value.
    UnexpectedPingResult,
}

impl TelemetryErrorKind {
    /// Create a new instance with an error message.
    pub fn error_with_msg<S: AsRef<str>>(self, msg: S) -> TelemetryError {
        TelemetryError {
            kind: self,
            msg: Some(msg.as_ref().to_string()),
        }
    }

    /// Create a new instance without an error message.
    pub fn error(self) -> TelemetryError {
        TelemetryError {
            kind: self,
            msg: None,
        }
    }
}

impl fmt::Display for TelemetryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/** Telemetry service error.

Create a new instance via [TelemetryErrorKind].
*/
#[derive(Debug)]
pub struct TelemetryError {
    kind: TelemetryErrorKind,
    msg: Option<String>,
}

impl TelemetryError {
    /// Return the type of error.
    pub fn kind(&self) -> &TelemetryErrorKind {
        &self.kind
    }
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(msg) = &self.msg {
            write!(f, "{} {}", self.kind, msg)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

impl AsRef<TelemetryError> for TelemetryError {
    fn as_ref(&self) -> &TelemetryError {
        self
    }
}

impl Error for TelemetryError {}
