// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Time related utils.

use chrono::{FixedOffset, TimeDelta, Utc};

/// DateTime is the alias for `chrono::DateTime<Utc>`.
pub type DateTime = chrono::DateTime<Utc>;

/// The gateway expects request timestamps in East Africa Time (UTC+3).
const GATEWAY_UTC_OFFSET_SECS: i32 = 3 * 3600;

/// Create datetime of now.
pub fn now() -> DateTime {
    Utc::now()
}

/// Add `secs` seconds to `time`, saturating on overflow.
pub fn add_secs(time: DateTime, secs: i64) -> DateTime {
    TimeDelta::try_seconds(secs)
        .and_then(|delta| time.checked_add_signed(delta))
        .unwrap_or(DateTime::MAX_UTC)
}

/// Format time into the gateway timestamp: `20210503034239` (YmdHis, East Africa Time).
pub fn format_timestamp(time: DateTime) -> String {
    let offset = FixedOffset::east_opt(GATEWAY_UTC_OFFSET_SECS).expect("offset must be in range");
    time.with_timezone(&offset)
        .format("%Y%m%d%H%M%S")
        .to_string()
}
