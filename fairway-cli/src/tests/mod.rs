//! Shared test harness modules for the Fairway CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;
use crate::harvest::*;

mod layers;
