//! Model backend environment check

use anyhow::Result;
use mailsort_core::{AIClient, ModelBackend};

/// Variables reported by `check-env`, grouped by backend
const ENV_VARS: &[(&str, &[&str])] = &[
    ("general", &["AI_BACKEND", "MAILSORT_CORPUS"]),
    (
        "azure",
        &[
            "AZURE_OPENAI_ENDPOINT",
            "AZURE_OPENAI_API_KEY",
            "AZURE_OPENAI_API_VERSION",
            "AZURE_OPENAI_DEPLOYMENT",
        ],
    ),
    (
        "openai_compatible",
        &[
            "OPENAI_COMPATIBLE_HOST",
            "OPENAI_COMPATIBLE_MODEL",
            "OPENAI_COMPATIBLE_API_KEY",
        ],
    ),
];

/// Value as it should be displayed: secrets are masked
pub fn display_value(name: &str, value: &str) -> String {
    if name.contains("KEY") {
        "*".repeat(20)
    } else {
        value.to_string()
    }
}

pub fn cmd_check_env() -> Result<()> {
    println!();
    println!("🔍 Model backend environment:");

    for (group, vars) in ENV_VARS {
        println!();
        println!("   [{}]", group);
        for var in *vars {
            match std::env::var(var).ok().filter(|v| !v.trim().is_empty()) {
                Some(value) => println!("   ✅ {}: {}", var, display_value(var, &value)),
                None => println!("   ❌ {}: not set", var),
            }
        }
    }

    println!();
    match AIClient::try_from_env() {
        Ok(client) => println!(
            "   Backend: {} ({} at {})",
            client.backend_name(),
            client.model(),
            client.host()
        ),
        Err(e) => println!("   Backend: none ({}); keyword rules only", e),
    }

    if let Ok(dir) = std::env::current_dir() {
        println!("   Working directory: {}", dir.display());
    }
    println!();
    Ok(())
}
