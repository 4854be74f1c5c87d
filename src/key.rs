//! Reference sigils and namespace aliasing for container keys.
//!
//! Keys are plain strings. A string argument is a *reference* when it starts
//! with a sigil:
//!
//! - `@name`: the built service registered under `name`
//! - `%name%`: the parameter `name`, spliced into or replacing the string
//! - `#name`: every service tagged `name`, in declaration order
//!
//! Definitions loaded under an alias have their keys prefixed with
//! `alias.`; references made from inside that scope are prefixed the same
//! way before lookup.

/// Marks a service reference: `@mailer`
pub const SERVICE_CHAR: char = '@';
/// Wraps a parameter name on both sides: `%mailer.host%`
pub const PARAMETER_CHAR: char = '%';
/// Marks a tag collection reference: `#listeners`
pub const TAG_CHAR: char = '#';

const ALIAS_SEPARATOR: char = '.';

/// Prefixes `key` with `alias`, or returns it unchanged for the root scope.
///
/// # Examples
///
/// ```rust
/// use ferrous_syringe::alias_key;
///
/// assert_eq!(alias_key("mailer", ""), "mailer");
/// assert_eq!(alias_key("mailer", "billing"), "billing.mailer");
/// ```
pub fn alias_key(key: &str, alias: &str) -> String {
    if alias.is_empty() {
        key.to_string()
    } else {
        format!("{alias}{ALIAS_SEPARATOR}{key}")
    }
}

/// Strips the service sigil, returning the referenced name.
#[inline]
pub fn service_name(arg: &str) -> Option<&str> {
    arg.strip_prefix(SERVICE_CHAR)
}

/// True when `arg` is a tag collection reference.
#[inline]
pub fn is_tag_reference(arg: &str) -> bool {
    arg.starts_with(TAG_CHAR)
}

/// Registry key of the collection for `tag`.
pub fn tag_key(tag: &str) -> String {
    if is_tag_reference(tag) {
        tag.to_string()
    } else {
        format!("{TAG_CHAR}{tag}")
    }
}

/// Key under which an abstract definition is stored.
pub(crate) fn abstract_key(key: &str, alias: &str) -> String {
    format!("{SERVICE_CHAR}{}", alias_key(key, alias))
}

/// Locates the first `%name%` span in `text`.
///
/// Returns the byte range of the whole placeholder (both sigils included)
/// and the inner name. `None` when fewer than two parameter sigils remain.
pub(crate) fn first_placeholder(text: &str) -> Option<(std::ops::Range<usize>, &str)> {
    let start = text.find(PARAMETER_CHAR)?;
    let inner = start + PARAMETER_CHAR.len_utf8();
    let end = inner + text[inner..].find(PARAMETER_CHAR)?;
    Some((start..end + PARAMETER_CHAR.len_utf8(), &text[inner..end]))
}

/// Number of parameter sigils in `text`.
pub(crate) fn placeholder_sigils(text: &str) -> usize {
    text.matches(PARAMETER_CHAR).count()
}
