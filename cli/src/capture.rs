//! Host snapshot for `device-state-capture` records.
//!
//! Only what the process can see without spawning anything: build target
//! constants, process id, working directory, and a few environment values.
//! OS-specific forensic collection is left to external tools, whose output
//! can be referenced with `evidence log --attach`.

use evidence_contracts::{Payload, PayloadValue};

/// Collect the snapshot as a payload.
pub fn host_snapshot() -> Payload {
    let mut platform = Payload::new();
    platform.insert("os".to_string(), std::env::consts::OS.into());
    platform.insert("family".to_string(), std::env::consts::FAMILY.into());
    platform.insert("arch".to_string(), std::env::consts::ARCH.into());

    let mut process = Payload::new();
    process.insert("pid".to_string(), u64::from(std::process::id()).into());
    process.insert(
        "cwd".to_string(),
        std::env::current_dir()
            .map(|p| PayloadValue::from(p.to_string_lossy().into_owned()))
            .unwrap_or_default(),
    );
    process.insert("user".to_string(), first_env(&["USER", "USERNAME"]));
    process.insert("hostname".to_string(), first_env(&["HOSTNAME", "COMPUTERNAME"]));

    let mut payload = Payload::new();
    payload.insert("platform".to_string(), platform.into());
    payload.insert("process".to_string(), process.into());
    payload.insert(
        "tool_version".to_string(),
        env!("CARGO_PKG_VERSION").into(),
    );
    payload
}

/// First set environment variable among `names`, or `Null`.
fn first_env(names: &[&str]) -> PayloadValue {
    names
        .iter()
        .find_map(|n| std::env::var(n).ok())
        .map(PayloadValue::from)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_has_platform_constants() {
        let snap = host_snapshot();
        let platform = snap["platform"].as_map().unwrap();
        assert_eq!(platform["os"].as_str(), Some(std::env::consts::OS));
        assert_eq!(platform["arch"].as_str(), Some(std::env::consts::ARCH));
        assert!(snap.contains_key("process"));
        assert_eq!(snap["tool_version"].as_str(), Some(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn missing_env_is_null() {
        assert_eq!(
            first_env(&["EVIDENCE_TEST_SURELY_UNSET_VARIABLE"]),
            PayloadValue::Null
        );
    }
}
