//! Naming helpers shared by synthesis and rendering

/// Convert PascalCase or camelCase to snake_case.
///
/// Runs of capitals are kept together as one word, so acronyms survive:
///
/// ```
/// use crdgen::util::to_snake_case;
/// assert_eq!(to_snake_case("PublicIPAddress"), "public_ip_address");
/// assert_eq!(to_snake_case("addressPrefixes"), "address_prefixes");
/// assert_eq!(to_snake_case("already_snake"), "already_snake");
/// ```
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev_lower = i > 0 && (chars[i - 1].is_ascii_lowercase() || chars[i - 1].is_ascii_digit());
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            let prev_upper = i > 0 && chars[i - 1].is_ascii_uppercase();
            if i > 0 && !result.ends_with('_') && (prev_lower || (prev_upper && next_lower)) {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

/// Naive English plural, good enough for resource kinds
///
/// ```
/// use crdgen::util::pluralize;
/// assert_eq!(pluralize("VirtualNetwork"), "VirtualNetworks");
/// assert_eq!(pluralize("Policy"), "Policies");
/// assert_eq!(pluralize("Address"), "Addresses");
/// ```
pub fn pluralize(s: &str) -> String {
    if let Some(stem) = s.strip_suffix('y') {
        if !stem.ends_with(['a', 'e', 'i', 'o', 'u']) {
            return format!("{}ies", stem);
        }
    }
    if s.ends_with('s') || s.ends_with('x') || s.ends_with("ch") || s.ends_with("sh") {
        return format!("{}es", s);
    }
    format!("{}s", s)
}

/// Inverse of [`pluralize`] for the common cases
///
/// ```
/// use crdgen::util::singularize;
/// assert_eq!(singularize("Tags"), "Tag");
/// assert_eq!(singularize("Policies"), "Policy");
/// assert_eq!(singularize("Addresses"), "Address");
/// assert_eq!(singularize("Status"), "Status");
/// ```
pub fn singularize(s: &str) -> String {
    if let Some(stem) = s.strip_suffix("ies") {
        return format!("{}y", stem);
    }
    for suffix in ["sses", "xes", "ches", "shes"] {
        if s.ends_with(suffix) {
            return s[..s.len() - 2].to_string();
        }
    }
    if s.ends_with("ss") || s.ends_with("us") {
        return s.to_string();
    }
    match s.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => s.to_string(),
    }
}
