//! Default values applied by the builder
//!
//! | field                            | default     |
//! |----------------------------------|-------------|
//! | `log_level`                      | `INFO`      |
//! | `debug`                          | `false`     |
//! | `max_concurrent_tasks`           | `10`        |
//! | `web_api_enabled`                | `false`     |
//! | `web_api_port`                   | `8000`      |
//! | `web_api_host`                   | `127.0.0.1` |
//! | `web_api_auth_enabled`           | `false`     |
//! | provider `timeout`               | `30`        |
//! | provider `max_retries`           | `3`         |
//! | tool `enabled`                   | `true`      |
//! | tool `timeout`                   | `30`        |
//! | `in_memory` `max_items`          | `1000`      |
//! | agent `execution_timeout`        | `300`       |
//! | agent `max_consecutive_failures` | `3`         |
//! | agent `verbose`                  | `false`     |

pub const LOG_LEVEL: &str = "INFO";
pub const DEBUG: bool = false;
pub const MAX_CONCURRENT_TASKS: u32 = 10;
pub const WEB_API_ENABLED: bool = false;
pub const WEB_API_PORT: u16 = 8000;
pub const WEB_API_HOST: &str = "127.0.0.1";
pub const WEB_API_AUTH_ENABLED: bool = false;

pub const PROVIDER_TIMEOUT_SECS: u64 = 30;
pub const PROVIDER_MAX_RETRIES: u32 = 3;

pub const TOOL_ENABLED: bool = true;
pub const TOOL_TIMEOUT_SECS: u64 = 30;

pub const IN_MEMORY_MAX_ITEMS: u64 = 1000;

pub const AGENT_EXECUTION_TIMEOUT_SECS: u64 = 300;
pub const AGENT_MAX_CONSECUTIVE_FAILURES: u32 = 3;
pub const AGENT_VERBOSE: bool = false;
