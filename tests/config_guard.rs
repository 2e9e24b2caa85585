use regex::Regex;
use std::fs;
use std::path::Path;

/// Fail CI if config or data files contain 64-hex private keys or API secrets.
#[test]
fn no_committed_secrets_in_configs() {
    let hex_key = Regex::new(r"0x?[a-fA-F0-9]{64}").unwrap();
    let secret_assignment =
        Regex::new(r#"(?i)^\s*(private_key|dinari_api_secret_key)\s*[=:]\s*"?[^"\s]+"#).unwrap();
    let candidates = [
        "config.toml",
        "config.example.toml",
        ".env.example",
        "data/basket.json",
        "data/crates.json",
    ];
    for file in candidates {
        if !Path::new(file).exists() {
            continue;
        }
        let body = fs::read_to_string(file).expect("read config");
        for (idx, line) in body.lines().enumerate() {
            if hex_key.is_match(line) {
                panic!("Secret-looking hex in {} at line {}", file, idx + 1);
            }
            if secret_assignment.is_match(line) {
                panic!("Secret value committed in {} at line {}", file, idx + 1);
            }
        }
    }
}
