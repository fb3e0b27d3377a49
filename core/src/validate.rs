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

//! Precondition checks run before any request reaches the gateway.
//!
//! Every check fails with an internal error, so a caller never observes a
//! partially sent request for invalid input.

use crate::{Error, Result};
use std::fmt::Display;

/// Fail if `value` is empty after trimming.
pub fn require_non_empty(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::internal(format!("'{name}' can not be empty")));
    }

    Ok(())
}

/// Fail if `value` is empty after trimming or not one of `allowed`.
pub fn require_one_of(name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    require_non_empty(name, value)?;

    let value = value.trim();
    if !allowed.contains(&value) {
        let expected = allowed
            .iter()
            .map(|v| format!("'{v}'"))
            .collect::<Vec<_>>()
            .join(" or ");
        return Err(Error::internal(format!(
            "Invalid value: '{value}' for '{name}', expected {expected}"
        )));
    }

    Ok(())
}

/// Fail if `value` is below `min` or above `max`.
///
/// A `None` bound is not checked.
pub fn require_in_range<T>(name: &str, value: T, min: Option<T>, max: Option<T>) -> Result<()>
where
    T: PartialOrd + Display + Copy,
{
    if let Some(min) = min {
        if value < min {
            return Err(Error::internal(format!(
                "Invalid value: '{value}' for '{name}', must be greater than or equal to {min}"
            )));
        }
    }

    if let Some(max) = max {
        if value > max {
            return Err(Error::internal(format!(
                "Invalid value: '{value}' for '{name}', must be less than or equal to {max}"
            )));
        }
    }

    Ok(())
}
