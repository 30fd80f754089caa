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

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

pub mod dbp;
pub mod time;
pub mod tm {
    //! Telemetry domain objects.

    mod bulk_count;
    mod client_record;
    mod counter_record;
    mod fingerprint_record;
    mod node_lease;
    mod randflake_id;
    mod telemetry_error;
    mod url_record;

    pub use self::bulk_count::BulkCountRow;
    pub use self::client_record::ClientRecord;
    pub use self::counter_record::CounterRecord;
    pub use self::fingerprint_record::FingerprintRecord;
    pub use self::node_lease::NodeLease;
    pub use self::randflake_id::RandflakeId;
    pub use self::telemetry_error::TelemetryError;
    pub use self::telemetry_error::TelemetryErrorKind;
    pub use self::url_record::UrlRecord;
}
