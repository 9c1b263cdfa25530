//! Content identity of runner definitions.

use sha2::{Digest, Sha256};

use crate::definition::RunnerDefinition;

/// Compute the uid of a definition: SHA-256 hex over its semantic fields.
///
/// Covers the version command, the declared version, the run commands and the
/// parameter declarations, all in declared order. Scalars are NUL-terminated
/// and lists carry their length, so moving text between fields changes the uid.
pub fn compute_uid(definition: &RunnerDefinition) -> String {
    let mut hasher = Sha256::new();
    update_field(&mut hasher, &definition.version_command);
    update_field(&mut hasher, &definition.version);
    update_list(&mut hasher, &definition.run_commands);
    update_list(&mut hasher, &definition.parameters);
    hex::encode(hasher.finalize())
}

fn update_field(hasher: &mut Sha256, value: &str) {
    hasher.update(value.as_bytes());
    hasher.update(b"\0");
}

fn update_list(hasher: &mut Sha256, items: &[String]) {
    hasher.update((items.len() as u64).to_le_bytes());
    for item in items {
        update_field(hasher, item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition() -> RunnerDefinition {
        RunnerDefinition::new(
            "ufo-launch --version",
            "0.16",
            vec!["ufo-launch read path={{ input }} ! null".to_string()],
            vec!["input:path".to_string(), "number:int".to_string()],
        )
    }

    #[test]
    fn test_uid_deterministic() {
        assert_eq!(compute_uid(&definition()), compute_uid(&definition()));
    }

    #[test]
    fn test_uid_is_sha256_hex() {
        let uid = compute_uid(&definition());
        assert_eq!(uid.len(), 64);
        assert!(uid.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_uid_single_field_delta() {
        let base = compute_uid(&definition());

        let mut changed = definition();
        changed.version_command.push_str(" 2>&1");
        assert_ne!(compute_uid(&changed), base);

        let mut changed = definition();
        changed.version = "0.17".to_string();
        assert_ne!(compute_uid(&changed), base);

        let mut changed = definition();
        changed.run_commands.push("sync".to_string());
        assert_ne!(compute_uid(&changed), base);

        let mut changed = definition();
        changed.parameters.reverse();
        assert_ne!(compute_uid(&changed), base);
    }

    #[test]
    fn test_uid_ignores_extends() {
        let mut child = definition();
        child.extends = Some("base".to_string());
        assert_eq!(compute_uid(&child), compute_uid(&definition()));
    }

    #[test]
    fn test_uid_field_boundaries_matter() {
        let a = RunnerDefinition::new("ab", "c", vec!["x".to_string()], vec![]);
        let b = RunnerDefinition::new("a", "bc", vec!["x".to_string()], vec![]);
        assert_ne!(compute_uid(&a), compute_uid(&b));

        let c = RunnerDefinition::new("v", "1", vec!["x".to_string(), "y:int".to_string()], vec![]);
        let d = RunnerDefinition::new("v", "1", vec!["x".to_string()], vec!["y:int".to_string()]);
        assert_ne!(compute_uid(&c), compute_uid(&d));
    }
}
