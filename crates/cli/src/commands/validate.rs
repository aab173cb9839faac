//! Configuration check

use anyhow::Result;
use serde::Serialize;
use std::fmt::Write as _;

use crate::commands::Context;
use crate::output::{print_value, OutputFormat};

#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub status: &'static str,
    pub base_url: String,
    pub organization_id: String,
    pub client_id: String,
    pub client_name: String,
    pub reachable: bool,
    pub authenticated: bool,
    pub response_time_ms: u64,
}

/// Mask all but the ends of a token
fn mask(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

pub async fn execute(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let elapsed = client.test_connection().await?;

    let config = &ctx.config;
    let report = ValidationReport {
        status: "valid",
        base_url: config.api.base_url.clone(),
        organization_id: config.organization.id.clone(),
        client_id: config.headers.client_id.clone(),
        client_name: config.headers.client_name.clone(),
        reachable: true,
        authenticated: true,
        response_time_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
    };

    let ai = ctx.format == OutputFormat::Ai;
    print_value(&report, ctx.format, || {
        let mut text = String::new();
        if ai {
            let _ = writeln!(text, "Configuration validation successful.");
        } else {
            let _ = writeln!(text, "✅ Configuration is valid");
        }
        let _ = writeln!(text, "   Base URL:        {}", report.base_url);
        let _ = writeln!(text, "   Organization:    {}", report.organization_id);
        let _ = writeln!(text, "   Auth token:      {}", mask(&config.api.auth_token));
        let _ = writeln!(text, "   Response time:   {}ms", report.response_time_ms);
        if ai {
            let _ = writeln!(text);
            let _ = writeln!(text, "Next steps:");
            let _ = writeln!(text, "- Pick a checkpoint: api-cli session set-checkpoint <CHECKPOINT_ID>");
            let _ = writeln!(text, "- Add a first step: api-cli navigate to <URL>");
        }
        text
    })
}
