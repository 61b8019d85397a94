//! Resource identifiers derived from node labels and ids.

use std::collections::HashSet;

fn sanitize(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// The distinguishing tail of a node id: `node_7` gives `7`, `app-service-0`
/// gives `0`, `n1` gives `1`.
pub fn id_suffix(id: &str) -> String {
    for sep in ['_', '-'] {
        if let Some((_, tail)) = id.rsplit_once(sep) {
            let tail = sanitize(tail);
            if !tail.is_empty() {
                return tail;
            }
        }
    }
    let digits = id.len() - id.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 {
        return id[id.len() - digits..].to_string();
    }
    sanitize(id)
}

/// Label with whitespace and punctuation removed, followed by the id suffix.
///
/// Only ASCII letters and digits survive, so the result is a bare identifier
/// in all three dialects: `Web-App` on `node_1` gives `WebApp1`. A label with
/// nothing left, or one starting with a digit, gets a `res` prefix.
pub fn base_ident(label: &str, id: &str) -> String {
    let stem = sanitize(label);
    let ident = format!("{stem}{}", id_suffix(id));
    match stem.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => ident,
        _ => format!("res{ident}"),
    }
}

/// Hands out unique identifiers for one compile run.
#[derive(Debug, Default)]
pub struct Namer {
    taken: HashSet<String>,
}

impl Namer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `base`, or `base_2`, `base_3`, ... if it is already in use.
    pub fn claim(&mut self, base: &str) -> String {
        if self.taken.insert(base.to_string()) {
            return base.to_string();
        }
        let mut k = 2;
        loop {
            let candidate = format!("{base}_{k}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            k += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_rules() {
        assert_eq!(id_suffix("node_7"), "7");
        assert_eq!(id_suffix("app-service-0"), "0");
        assert_eq!(id_suffix("n1"), "1");
        assert_eq!(id_suffix("rg-main"), "main");
        assert_eq!(id_suffix("trailing_"), "trailing");
        assert_eq!(id_suffix("plain"), "plain");
    }

    #[test]
    fn idents_strip_whitespace() {
        assert_eq!(base_ident("My Storage", "node_7"), "MyStorage7");
        assert_eq!(base_ident("Web", "n1"), "Web1");
        assert_eq!(base_ident("Azure AD B2C", "node_3"), "AzureADB2C3");
    }

    #[test]
    fn idents_drop_punctuation_and_non_ascii() {
        assert_eq!(base_ident("Web-App", "node_1"), "WebApp1");
        assert_eq!(base_ident("api.gateway (v2)", "node_2"), "apigatewayv22");
        assert_eq!(base_ident("Café", "node_3"), "Caf3");
        assert_eq!(base_ident("日本", "node_4"), "res4");
    }

    #[test]
    fn idents_never_start_with_a_digit() {
        assert_eq!(base_ident("", "node_4"), "res4");
        assert_eq!(base_ident("3D Render", "node_1"), "res3DRender1");
        assert_eq!(base_ident("   ", "x"), "resx");
    }

    #[test]
    fn namer_appends_counter_on_collision() {
        let mut namer = Namer::new();
        assert_eq!(namer.claim("Web1"), "Web1");
        assert_eq!(namer.claim("Web1"), "Web1_2");
        assert_eq!(namer.claim("Web1"), "Web1_3");
        assert_eq!(namer.claim("DB2"), "DB2");
    }
}
