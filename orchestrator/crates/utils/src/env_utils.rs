use std::env::VarError;

pub fn get_env_var(key: &str) -> Result<String, VarError> {
    std::env::var(key)
}

pub fn get_env_var_or_default(key: &str, default: &str) -> String {
    get_env_var(key).unwrap_or_else(|_| default.to_string())
}

/// Returns `None` when the variable is unset or empty.
pub fn get_env_var_optional(key: &str) -> Option<String> {
    match get_env_var(key) {
        Ok(s) if !s.trim().is_empty() => Some(s),
        _ => None,
    }
}
