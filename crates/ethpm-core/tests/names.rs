mod common;

use common::*;
use ethpm_core::rules::grammar::{is_package_name, PACKAGE_NAME_MAX_LEN};
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #[test]
    fn well_formed_names_accepted(name in "[a-z][a-z0-9-]{0,254}") {
        prop_assert!(is_package_name(&name));
        prop_assert!(check(&with("name", json!(name))).is_valid());
    }

    #[test]
    fn leading_digit_rejected(name in "[0-9][a-z0-9-]{0,30}") {
        prop_assert!(!is_package_name(&name));
    }

    #[test]
    fn any_uppercase_rejected(prefix in "[a-z][a-z0-9-]{0,10}", upper in "[A-Z]", rest in "[a-z0-9-]{0,10}") {
        let name = format!("{prefix}{upper}{rest}");
        prop_assert!(!is_package_name(&name));
    }

    #[test]
    fn separators_rejected(prefix in "[a-z]{1,10}", sep in "[./_: ]", rest in "[a-z]{0,10}") {
        let name = format!("{prefix}{sep}{rest}");
        prop_assert!(!is_package_name(&name));
    }
}

#[test]
fn length_limit_is_inclusive() {
    assert!(is_package_name(&"a".repeat(PACKAGE_NAME_MAX_LEN)));
    assert!(!is_package_name(&"a".repeat(PACKAGE_NAME_MAX_LEN + 1)));
    assert_violation(&with("name", json!("a".repeat(256))), "name", "package-name");
}
