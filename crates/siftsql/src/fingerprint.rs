use crate::{
    condition::{Condition, Describe},
    filter::Filter,
    operand::{self, Operand, Resolved},
    record::FieldSource,
};
use sha2::{Digest, Sha256};
use std::fmt;

///
/// FilterFingerprint
///
/// Stable, deterministic digest of a filter's semantic content: column
/// names, condition kinds, and resolved values in category order. The
/// placeholder token, numbering mode, and starting offset never feed the
/// digest, so the fingerprint identifies *what* is being filtered, not how
/// it will be rendered.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FilterFingerprint([u8; 32]);

impl FilterFingerprint {
    #[must_use]
    pub fn as_hex(&self) -> String {
        let mut out = String::with_capacity(64);
        for byte in self.0 {
            use std::fmt::Write as _;
            let _ = write!(out, "{byte:02x}");
        }
        out
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for FilterFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_hex())
    }
}

impl Filter {
    /// Canonical key text for this condition set.
    ///
    /// One `-`-separated entry per condition: sanitized column name, kind
    /// tag, then the resolved value(s) in double quotes (comma-joined for
    /// multi-operand kinds). Group members emit inline with their own tags
    /// in member order, without a group-level wrapper. Unresolvable
    /// operands render as empty text; a key is always produced.
    #[must_use]
    pub fn make_key(&self) -> String {
        let mut key = String::new();
        let data = self.data_source();
        for condition in self.conditions() {
            encode_describe(&mut key, condition.describe(), data);
        }
        key
    }

    /// SHA-256 fingerprint of the canonical key.
    #[must_use]
    pub fn fingerprint(&self) -> FilterFingerprint {
        let mut hasher = Sha256::new();
        hasher.update(self.make_key().as_bytes());
        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        FilterFingerprint(out)
    }

    /// Lower-case hex digest of the canonical key.
    #[must_use]
    pub fn hash(&self) -> String {
        self.fingerprint().as_hex()
    }
}

fn encode_describe(key: &mut String, describe: Describe<'_>, data: Option<&dyn FieldSource>) {
    match describe {
        Describe::Compare {
            column,
            tag,
            operand,
        } => {
            push_entry_separator(key);
            key.push_str(&sanitize_column(column));
            key.push_str(tag);
            key.push('"');
            key.push_str(&sanitize_value(&resolve_text(data, operand)));
            key.push('"');
        }
        Describe::Membership {
            column,
            tag,
            operands,
        } => {
            push_entry_separator(key);
            key.push_str(&sanitize_column(column));
            key.push_str(tag);
            key.push('"');
            let joined = operands
                .iter()
                .map(|operand| sanitize_value(&resolve_text(data, operand)))
                .collect::<Vec<_>>()
                .join(",");
            key.push_str(&joined);
            key.push('"');
        }
        Describe::Group { members } => {
            for member in members {
                encode_describe(key, member.describe(), data);
            }
        }
    }
}

fn push_entry_separator(key: &mut String) {
    if !key.is_empty() {
        key.push('-');
    }
}

// Lookup failures render as empty text; keys never fail.
fn resolve_text(data: Option<&dyn FieldSource>, operand: &Operand) -> String {
    match operand::resolve(data, operand) {
        Ok(Resolved::Value(value)) => value.canonical_text(),
        Ok(Resolved::Null | Resolved::Missing) | Err(_) => String::new(),
    }
}

// Trim, drop spaces and brackets, map underscores to hyphens, lower-case.
fn sanitize_column(column: &str) -> String {
    column
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '[' | ']'))
        .map(|c| if c == '_' { '-' } else { c })
        .flat_map(char::to_lowercase)
        .collect()
}

fn sanitize_value(text: &str) -> String {
    text.trim().chars().filter(|c| *c != ' ').collect()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        condition::{Between, Eq, In, Like, Ne, NotIn, OrGroup},
        filter::Filter,
        operand::Operand,
        record::Record,
    };
    use proptest::prelude::*;

    fn sample_filter() -> Filter {
        let mut filter = Filter::new();
        filter
            .push_eq(Eq::raw("first_name", "Zaldy"))
            .push_eq(Eq::raw("last_name", "Baguinon"))
            .push_ne(Ne::raw("first_name", "James"))
            .push_like(Like::raw("middle_name", "Garcia"))
            .push_in(In::raw("stooge", ["Larry", "Curly", "Moe"]))
            .push_not_in(NotIn::raw("nick_name", ["Tito", "Vic", "Joey"]))
            .push_between(Between::raw("age", 21i64, 65i64));
        filter
    }

    #[test]
    fn key_entry_format_per_kind() {
        let mut filter = Filter::new();
        filter.push_eq(Eq::raw("first_name", "Zaldy"));
        assert_eq!(filter.make_key(), "first-name=\"Zaldy\"");

        let mut filter = Filter::new();
        filter.push_ne(Ne::raw("first_name", "James"));
        assert_eq!(filter.make_key(), "first-name=!\"James\"");

        let mut filter = Filter::new();
        filter.push_like(Like::raw("middle_name", "Garcia"));
        assert_eq!(filter.make_key(), "middle-name=%\"Garcia\"");

        let mut filter = Filter::new();
        filter.push_in(In::raw("stooge", ["Larry", "Curly", "Moe"]));
        assert_eq!(filter.make_key(), "stooge=|\"Larry,Curly,Moe\"");

        let mut filter = Filter::new();
        filter.push_not_in(NotIn::raw("nick_name", ["Tito", "Vic"]));
        assert_eq!(filter.make_key(), "nick-name=!|\"Tito,Vic\"");

        let mut filter = Filter::new();
        filter.push_between(Between::raw("age", 21i64, 65i64));
        assert_eq!(filter.make_key(), "age=+\"21,65\"");
    }

    #[test]
    fn entries_join_with_hyphens_in_category_order() {
        let mut filter = Filter::new();
        filter
            .push_ne(Ne::raw("b", 2i64))
            .push_eq(Eq::raw("a", 1i64));
        assert_eq!(filter.make_key(), "a=\"1\"-b=!\"2\"");
    }

    #[test]
    fn column_sanitization_strips_brackets_and_case() {
        let mut filter = Filter::new();
        filter.push_eq(Eq::raw(" [Last_Name] ", "Lumibao"));
        assert_eq!(filter.make_key(), "last-name=\"Lumibao\"");
    }

    #[test]
    fn value_sanitization_drops_spaces() {
        let mut filter = Filter::new();
        filter.push_eq(Eq::raw("name", " Zaldy  Baguinon "));
        assert_eq!(filter.make_key(), "name=\"ZaldyBaguinon\"");
    }

    #[test]
    fn null_operand_renders_empty_text() {
        let mut filter = Filter::new();
        filter.push_eq(Eq::new("title", Operand::null()));
        assert_eq!(filter.make_key(), "title=\"\"");
    }

    #[test]
    fn or_group_members_emit_inline() {
        let mut filter = Filter::new();
        filter.push_or(
            OrGroup::default()
                .push(Eq::raw("nick_name", "James"))
                .push(Eq::raw("age", 32i64)),
        );
        assert_eq!(filter.make_key(), "nick-name=\"James\"-age=\"32\"");
    }

    #[test]
    fn by_reference_operands_resolve_through_the_record() {
        let data = Record::new().with("FirstName", "Zaldy");
        let mut with_field = Filter::new().with_data(data);
        with_field.push_eq(Eq::field("first_name", "FirstName"));

        let mut with_raw = Filter::new();
        with_raw.push_eq(Eq::raw("first_name", "Zaldy"));

        assert_eq!(with_field.make_key(), with_raw.make_key());
        assert_eq!(with_field.hash(), with_raw.hash());
    }

    #[test]
    fn hash_is_lowercase_hex_of_sha256() {
        let filter = sample_filter();
        let hash = filter.hash();
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(hash, filter.fingerprint().to_string());
    }

    #[test]
    fn hash_ignores_placeholder_configuration() {
        let base = sample_filter();
        let configured = sample_filter()
            .with_placeholder("$")
            .with_numbered(true)
            .with_offset(40);

        assert_eq!(base.make_key(), configured.make_key());
        assert_eq!(base.hash(), configured.hash());
    }

    #[test]
    fn hash_is_sensitive_to_order_column_kind_and_value() {
        let base = sample_filter();

        let mut reordered = sample_filter();
        reordered.eq.swap(0, 1);
        assert_ne!(base.hash(), reordered.hash());

        let mut renamed = sample_filter();
        renamed.eq[0].column = "given_name".to_string();
        assert_ne!(base.hash(), renamed.hash());

        let mut rekinded = Filter::new();
        rekinded.push_ne(Ne::raw("first_name", "Zaldy"));
        let mut base_eq = Filter::new();
        base_eq.push_eq(Eq::raw("first_name", "Zaldy"));
        assert_ne!(base_eq.hash(), rekinded.hash());

        let mut revalued = sample_filter();
        revalued.eq[0].value = Operand::raw("Other");
        assert_ne!(base.hash(), revalued.hash());
    }

    proptest! {
        // The fingerprint must be a pure function of the condition set,
        // whatever rendering configuration the filter carries.
        #[test]
        fn fingerprint_invariant_to_rendering_config(
            token in "[a-z@$:]{0,3}",
            numbered in any::<bool>(),
            offset in 0u32..1000,
        ) {
            let base = sample_filter();
            let configured = sample_filter()
                .with_placeholder(token)
                .with_numbered(numbered)
                .with_offset(offset);

            prop_assert_eq!(base.fingerprint(), configured.fingerprint());
        }

        // Offsets must stay contiguous however the numbering is configured.
        #[test]
        fn numbered_offsets_are_contiguous(offset in 0u32..1000) {
            let filter = sample_filter()
                .with_placeholder("@p")
                .with_numbered(true)
                .with_offset(offset);

            let built = filter.build().unwrap();
            // 2 eq + 1 ne + 1 like + 3 in + 3 not-in + 2 between markers.
            prop_assert_eq!(built.next_offset, offset + 12);
            let first = built.fragments.first().unwrap();
            let expected_first = format!("first_name = @p{}", offset + 1);
            prop_assert_eq!(first.as_str(), expected_first.as_str());
        }
    }
}
