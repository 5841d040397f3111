//! Built-in `func` rule registration table.
//!
//! `func` rule bodies are dotted paths like `validators.luhn`, resolved
//! against a closed registration table built at startup rather than a
//! runtime import: every built-in validator/matcher is registered here under
//! a stable name, and a YAML `func:` reference either resolves against this
//! table or is a [`crate::error::CatalogIssueKind::RuleResolve`] — never a
//! dynamic import.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Signature every registered function must have: a single candidate
/// string in, a boolean verdict out.
pub type RegisteredFn = fn(&str) -> bool;

static REGISTRY: Lazy<HashMap<&'static str, RegisteredFn>> = Lazy::new(|| {
    let mut m: HashMap<&'static str, RegisteredFn> = HashMap::new();
    m.insert("validators.luhn", validators::luhn);
    m.insert("validators.email_shape", validators::email_shape);
    m.insert("validators.ipv4", validators::ipv4);
    m.insert("validators.ipv6", validators::ipv6);
    m.insert("validators.ascii_only", validators::ascii_only);
    m.insert("validators.not_all_same_digit", validators::not_all_same_digit);
    m.insert("validators.uuid_v4", validators::uuid_v4);
    m.insert("matchers.inn_ru_checksum", matchers::inn_ru_checksum);
    m
});

/// Look up a `func:` reference by its dotted path. `None` means the caller
/// should raise a [`crate::error::CatalogIssueKind::RuleResolve`] and mark
/// the rule inactive rather than failing catalog load.
pub fn resolve(path: &str) -> Option<RegisteredFn> {
    REGISTRY.get(path).copied()
}

/// Every name the registry currently exposes, for diagnostics and tests.
pub fn registered_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = REGISTRY.keys().copied().collect();
    names.sort_unstable();
    names
}

/// Validators usable as a data rule's `validator:` qualifier, gating a
/// candidate that already matched its `text`/`ppr` body.
mod validators {
    use super::*;

    /// Luhn checksum, used for credit-card-shaped numeric strings.
    pub fn luhn(s: &str) -> bool {
        let digits: Vec<u32> = s.chars().filter_map(|c| c.to_digit(10)).collect();
        if digits.len() != s.chars().filter(|c| !c.is_whitespace()).count() || digits.len() < 2 {
            return false;
        }
        let sum: u32 = digits
            .iter()
            .rev()
            .enumerate()
            .map(|(i, &d)| if i % 2 == 1 { let doubled = d * 2; if doubled > 9 { doubled - 9 } else { doubled } } else { d })
            .sum();
        sum % 10 == 0
    }

    static EMAIL_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static email regex"));

    /// A deliberately loose shape check; the email *rule* does the main
    /// classification, this validator just rejects obvious non-emails.
    pub fn email_shape(s: &str) -> bool {
        EMAIL_RE.is_match(s)
    }

    static IPV4_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^(\d{1,3})\.(\d{1,3})\.(\d{1,3})\.(\d{1,3})$").expect("static ipv4 regex")
    });

    pub fn ipv4(s: &str) -> bool {
        let Some(caps) = IPV4_RE.captures(s) else { return false };
        (1..=4).all(|i| caps.get(i).and_then(|m| m.as_str().parse::<u16>().ok()).is_some_and(|n| n <= 255))
    }

    pub fn ipv6(s: &str) -> bool {
        s.contains(':') && s.split(':').count() >= 3 && s.split(':').all(|g| g.is_empty() || g.chars().all(|c| c.is_ascii_hexdigit()))
    }

    pub fn ascii_only(s: &str) -> bool {
        s.is_ascii()
    }

    /// Rejects strings like `"0000000000"` that pass shape checks (e.g. a
    /// phone-number grammar) but are placeholder junk.
    pub fn not_all_same_digit(s: &str) -> bool {
        let mut digits = s.chars().filter(|c| c.is_ascii_digit());
        match digits.next() {
            None => false,
            Some(first) => !digits.all(|d| d == first),
        }
    }

    static UUID_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-4[0-9a-fA-F]{3}-[89abAB][0-9a-fA-F]{3}-[0-9a-fA-F]{12}$")
            .expect("static uuid regex")
    });

    pub fn uuid_v4(s: &str) -> bool {
        UUID_RE.is_match(s)
    }
}

/// Matchers usable directly as a data rule's `func:` body (whole-string
/// predicate, as opposed to a gating `validator:`).
mod matchers {
    /// Checksum used by Russian INN (tax identification number) fields;
    /// accepts both the 10- and 12-digit forms.
    pub fn inn_ru_checksum(s: &str) -> bool {
        let digits: Vec<u32> = s.chars().filter_map(|c| c.to_digit(10)).collect();
        if digits.len() != s.len() {
            return false;
        }
        match digits.len() {
            10 => {
                const W: [u32; 9] = [2, 4, 10, 3, 5, 9, 4, 6, 8];
                let sum: u32 = W.iter().zip(&digits[..9]).map(|(w, d)| w * d).sum();
                (sum % 11 % 10) == digits[9]
            }
            12 => {
                const W1: [u32; 10] = [7, 2, 4, 10, 3, 5, 9, 4, 6, 8];
                const W2: [u32; 11] = [3, 7, 2, 4, 10, 3, 5, 9, 4, 6, 8];
                let c11: u32 = W1.iter().zip(&digits[..10]).map(|(w, d)| w * d).sum();
                let c11 = c11 % 11 % 10;
                let c12: u32 = W2.iter().zip(&digits[..11]).map(|(w, d)| w * d).sum();
                let c12 = c12 % 11 % 10;
                c11 == digits[10] && c12 == digits[11]
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_names() {
        assert!(resolve("validators.luhn").is_some());
        assert!(resolve("no.such.function").is_none());
    }

    #[test]
    fn luhn_accepts_known_valid_number() {
        assert!(validators::luhn("4532015112830366"));
        assert!(!validators::luhn("4532015112830367"));
    }

    #[test]
    fn email_shape_basic() {
        assert!(validators::email_shape("a@b.com"));
        assert!(!validators::email_shape("not-an-email"));
    }

    #[test]
    fn ipv4_range_checked() {
        assert!(validators::ipv4("192.168.1.1"));
        assert!(!validators::ipv4("999.1.1.1"));
        assert!(!validators::ipv4("1.2.3"));
    }

    #[test]
    fn not_all_same_digit_rejects_placeholders() {
        assert!(!validators::not_all_same_digit("0000000000"));
        assert!(validators::not_all_same_digit("0123456789"));
    }

    #[test]
    fn inn_checksum_10_digit() {
        assert!(matchers::inn_ru_checksum("7707083893"));
    }
}
