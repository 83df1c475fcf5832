//! `${name}` placeholder substitution
//!
//! References are looked up in the same property set. There is exactly one
//! form, `${name}`: no defaults, no nesting, no escaping.
//!
//! - an unknown name resolves to the empty string
//! - a `${` without a `}` after it loses its marker and resolution stops
//! - a substituted value is scanned again, so chains like `a=${b}`,
//!   `b=${c}` resolve fully
//! - a reference that leads back to itself stays as written

use std::collections::{HashMap, HashSet};

use crate::properties::PropertySet;

const OPEN: &str = "${";
const CLOSE: char = '}';

/// Longest value, in bytes, a substitution may produce
///
/// References that fan out (`a=${b}${b}`, `b=${c}${c}`, ...) grow a value
/// exponentially without ever forming a cycle. Resolution of such a value
/// stops before it would pass this size.
pub const MAX_RESOLVED_LEN: usize = 1 << 20;

/// Resolve placeholders in every value of `props`, in place
///
/// Values are rewritten in key order; a value resolved later sees the
/// already rewritten form of earlier values.
pub fn resolve_placeholders(props: &mut PropertySet) {
    props.rewrite_values(|value, current| {
        value
            .contains(OPEN)
            .then(|| resolve_value(value, current))
    });
}

/// Resolve the placeholders in one value against `props`
///
/// A reference to a name whose value leads back to itself (`a=${a}`,
/// `a=${b}`/`b=${a}`) is left in place and ends resolution of the value.
pub fn resolve_value(value: &str, props: &PropertySet) -> String {
    let mut value = value.to_string();
    let mut cycles = CycleCheck::new(props);

    while let Some(start) = value.find(OPEN) {
        match value.find(CLOSE) {
            Some(end) if start < end => {
                let token = value[start..=end].to_string();
                let name = &token[OPEN.len()..token.len() - 1];

                if cycles.is_circular(name) {
                    log::warn!(
                        "Circular placeholder reference {}, leaving it unresolved",
                        token
                    );
                    break;
                }

                let replacement = props.get(name).unwrap_or_else(|| {
                    log::warn!("No property '{}', replacing {} with ''", name, token);
                    ""
                });

                let occurrences = value.matches(token.as_str()).count();
                let resolved_len = (value.len() - occurrences * token.len())
                    .saturating_add(occurrences.saturating_mul(replacement.len()));
                if resolved_len > MAX_RESOLVED_LEN {
                    log::warn!(
                        "Giving up on placeholders at {}: the value would exceed {} bytes",
                        token,
                        MAX_RESOLVED_LEN
                    );
                    break;
                }

                value = value.replace(&token, replacement);
            }
            _ => {
                value = value.replacen(OPEN, "", 1);
                log::warn!("Cannot resolve all properties in {}", value);
                break;
            }
        }
    }

    value
}

/// Remembers which names refer back to themselves through their values
struct CycleCheck<'a> {
    props: &'a PropertySet,
    known: HashMap<String, bool>,
}

impl<'a> CycleCheck<'a> {
    fn new(props: &'a PropertySet) -> Self {
        Self {
            props,
            known: HashMap::new(),
        }
    }

    fn is_circular(&mut self, name: &str) -> bool {
        if let Some(&circular) = self.known.get(name) {
            return circular;
        }
        let circular = refers_back(self.props, name);
        self.known.insert(name.to_string(), circular);
        circular
    }
}

/// Whether following references from `name`'s value reaches `name` again
fn refers_back(props: &PropertySet, name: &str) -> bool {
    let mut visited = HashSet::new();
    let mut pending = props.get(name).map(references).unwrap_or_default();

    while let Some(next) = pending.pop() {
        if next == name {
            return true;
        }
        if visited.insert(next) {
            if let Some(value) = props.get(next) {
                pending.extend(references(value));
            }
        }
    }

    false
}

/// Names of the `${name}` tokens in `value`, in order
fn references(value: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = value;

    while let Some(start) = rest.find(OPEN) {
        let after = &rest[start + OPEN.len()..];
        let Some(end) = after.find(CLOSE) else {
            break;
        };
        names.push(&after[..end]);
        rest = &after[end + 1..];
    }

    names
}
