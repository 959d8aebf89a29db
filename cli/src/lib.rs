// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Command-line interface of kcal.

mod arg;
mod cli;
mod cmd_dashboard;
mod cmd_eat;
mod cmd_export;
mod cmd_generate_completion;
mod cmd_item;
mod cmd_settings;
mod cmd_sync;
mod config;
mod item_formatter;
mod summary_formatter;
mod table;
mod util;

pub use crate::cli::{Cli, Commands, run};
pub use crate::config::Config;
