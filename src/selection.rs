//! "All or particular" selection handling for multi-select pickers.
//!
//! Any picker that offers a wildcard entry next to individual choices
//! (tag values, organization and role assignment) routes its selection
//! changes through [`all_or_particular`], which keeps the wildcard and
//! specific items mutually exclusive.

/// Sentinel value meaning "all available options"
pub const WILDCARD: &str = "*";

/// Reconciles a selection change against the wildcard.
///
/// `old_vals` is the selection before the user's click and `new_vals` the
/// raw selection after it. Selections of zero or one item are always legal.
/// If the wildcard was already active and another item joined it, the
/// wildcard is dropped; if the wildcard was just picked, only the wildcard
/// remains. Order of `new_vals` is preserved.
pub fn all_or_particular<S: AsRef<str>>(old_vals: &[S], new_vals: &[S]) -> Vec<String> {
    let new_vals: Vec<String> = new_vals.iter().map(|v| v.as_ref().to_string()).collect();
    if new_vals.len() <= 1 {
        return new_vals;
    }

    let is_all = new_vals.iter().any(|v| v == WILDCARD);
    let was_all = old_vals.iter().any(|v| v.as_ref() == WILDCARD);

    match (was_all, is_all) {
        (true, true) => new_vals.into_iter().filter(|v| v != WILDCARD).collect(),
        (false, true) => vec![WILDCARD.to_string()],
        _ => new_vals,
    }
}

/// Adds `value` to `selected` if absent, removes it otherwise.
pub fn toggle(selected: &[String], value: &str) -> Vec<String> {
    if selected.iter().any(|v| v == value) {
        selected.iter().filter(|v| *v != value).cloned().collect()
    } else {
        let mut next = selected.to_vec();
        next.push(value.to_string());
        next
    }
}

/// Toggles `value` and then applies the wildcard rule to the result.
pub fn toggle_with_wildcard(selected: &[String], value: &str) -> Vec<String> {
    let toggled = toggle(selected, value);
    all_or_particular(selected, &toggled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_selection() -> impl Strategy<Value = Vec<String>> {
        prop::collection::btree_set(
            prop_oneof![Just("*"), Just("a"), Just("b"), Just("c"), Just("d")],
            0..5,
        )
        .prop_map(|set| set.into_iter().map(str::to_string).collect())
    }

    proptest! {
        #[test]
        fn prop_merge_is_idempotent(old in arb_selection(), new in arb_selection()) {
            let merged = all_or_particular(&old, &new);
            prop_assert_eq!(all_or_particular(&new, &merged), merged);
        }

        #[test]
        fn prop_wildcard_never_mixed(old in arb_selection(), new in arb_selection()) {
            let merged = all_or_particular(&old, &new);
            if merged.len() > 1 {
                prop_assert!(!merged.iter().any(|v| v == WILDCARD));
            }
        }
    }

    fn s(vals: &[&str]) -> Vec<String> {
        vals.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_specific_item_replaces_wildcard() {
        assert_eq!(all_or_particular(&["*"], &["*", "a"]), s(&["a"]));
    }

    #[test]
    fn test_wildcard_replaces_specific_items() {
        assert_eq!(all_or_particular(&["a"], &["a", "*"]), s(&["*"]));
        assert_eq!(all_or_particular(&["a", "b"], &["a", "b", "*"]), s(&["*"]));
    }

    #[test]
    fn test_small_selections_pass_through() {
        assert_eq!(all_or_particular(&["a", "b"], &["a"]), s(&["a"]));
        assert_eq!(all_or_particular(&["a"], &[] as &[&str]), Vec::<String>::new());
        assert_eq!(all_or_particular(&["a"], &["*"]), s(&["*"]));
    }

    #[test]
    fn test_plain_multi_selection_unchanged() {
        assert_eq!(all_or_particular(&["a"], &["a", "b"]), s(&["a", "b"]));
    }

    #[test]
    fn test_reapplying_is_idempotent() {
        let cases: Vec<(Vec<String>, Vec<String>)> = vec![
            (s(&["*"]), s(&["*", "a"])),
            (s(&["a"]), s(&["a", "*"])),
            (s(&["a", "b"]), s(&["a"])),
            (s(&[]), s(&["a", "b", "*"])),
            (s(&["*", "a"]), s(&["*", "a", "b"])),
            (s(&["x"]), s(&["x", "y"])),
        ];

        for (old, new) in cases {
            let once = all_or_particular(&old, &new);
            let twice = all_or_particular(&new, &once);
            assert_eq!(once, twice, "old={:?} new={:?}", old, new);
        }
    }

    #[test]
    fn test_toggle_with_wildcard() {
        let selected = s(&["a", "b"]);
        assert_eq!(toggle_with_wildcard(&selected, "*"), s(&["*"]));

        let selected = s(&["*"]);
        assert_eq!(toggle_with_wildcard(&selected, "c"), s(&["c"]));
        assert_eq!(toggle_with_wildcard(&selected, "*"), Vec::<String>::new());
    }
}
