use once_cell::sync::Lazy;
use regex::Regex;

static LABEL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?$").expect("label regex is valid"));

const MAX_HOSTNAME_LEN: usize = 253;

/// Lower-cases and strips surrounding whitespace and the trailing root dot.
pub fn normalize_host(host: &str) -> String {
    host.trim().trim_end_matches('.').to_ascii_lowercase()
}

/// A single DNS label such as a subdomain (`dentist-1`).
pub fn is_valid_label(label: &str) -> bool {
    LABEL_REGEX.is_match(label)
}

/// A fully qualified host name with at least two labels. Expects a normalized host.
pub fn is_valid_fqdn(host: &str) -> bool {
    if host.is_empty() || host.len() > MAX_HOSTNAME_LEN {
        return false;
    }
    let labels: Vec<&str> = host.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| is_valid_label(l)) && !labels.iter().all(|l| l.chars().all(|c| c.is_ascii_digit()))
}

/// Whether `host` is one of the platform's own hosts.
pub fn is_reserved_host(host: &str, reserved: &[String]) -> bool {
    let host = normalize_host(host);
    reserved.iter().any(|r| normalize_host(r) == host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("dentist-1", true)]
    #[case("a", true)]
    #[case("-dentist", false)]
    #[case("dentist-", false)]
    #[case("den tist", false)]
    #[case("Dentist", false)]
    #[case("", false)]
    fn labels(#[case] label: &str, #[case] valid: bool) {
        assert_eq!(is_valid_label(label), valid);
    }

    #[rstest]
    #[case("wondrousdigital.com", true)]
    #[case("www.dentist-office.co.uk", true)]
    #[case("localhost", false)]
    #[case("bad..com", false)]
    #[case("192.168.0.1", false)]
    #[case("under_score.com", false)]
    fn fqdns(#[case] host: &str, #[case] valid: bool) {
        assert_eq!(is_valid_fqdn(host), valid);
    }

    #[test]
    fn reserved_hosts_match_case_and_trailing_dot_insensitively() {
        let reserved = vec!["wondrousdigital.com".to_string(), "www.wondrousdigital.com".to_string()];
        assert!(is_reserved_host("WondrousDigital.com.", &reserved));
        assert!(is_reserved_host("www.wondrousdigital.com", &reserved));
        assert!(!is_reserved_host("dentist-1.wondrousdigital.com", &reserved));
    }
}
