//! Property-based test generators using proptest.

use std::collections::BTreeMap;

use proptest::prelude::*;

use crate::fixtures::PackageSeed;

/// Strategy for valid package names.
pub fn package_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9+_-]{0,23}").expect("Invalid regex")
}

/// Strategy for `pkgver-pkgrel` versions starting with a digit.
pub fn version_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[0-9]{1,2}\\.[0-9]{1,2}(\\.[0-9]{1,3})?-[1-9]").expect("Invalid regex")
}

/// Strategy for free-text descriptions without NUL bytes.
pub fn description_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9 ,.()-]{0,60}").expect("Invalid regex")
}

/// Strategy for dependency strings such as `glibc>=2.38: for stuff`.
pub fn depstring_strategy() -> impl Strategy<Value = String> {
    (
        package_name_strategy(),
        prop::option::of((prop::sample::select(vec!["=", ">=", "<=", ">", "<"]), version_strategy())),
        prop::option::of(prop::string::string_regex("[a-z][a-z ]{0,30}").expect("Invalid regex")),
    )
        .prop_map(|(name, constraint, desc)| {
            let mut out = name;
            if let Some((op, version)) = constraint {
                out.push_str(op);
                out.push_str(&version);
            }
            if let Some(desc) = desc {
                out.push_str(": ");
                out.push_str(&desc);
            }
            out
        })
}

/// Strategy for one package record.
pub fn package_seed_strategy() -> impl Strategy<Value = PackageSeed> {
    (
        package_name_strategy(),
        version_strategy(),
        description_strategy(),
        0i64..(1 << 36),
    )
        .prop_map(|(name, version, desc, isize)| {
            let mut seed = PackageSeed::new(name, version);
            seed.desc = Some(desc);
            seed.isize = isize;
            seed
        })
}

/// Strategy for a repository of packages with unique names.
pub fn repo_packages_strategy(max: usize) -> impl Strategy<Value = Vec<PackageSeed>> {
    prop::collection::vec(package_seed_strategy(), 0..max).prop_map(|seeds| {
        let unique: BTreeMap<String, PackageSeed> =
            seeds.into_iter().map(|seed| (seed.name.clone(), seed)).collect();
        unique.into_values().collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn versions_start_with_a_digit(version in version_strategy()) {
            prop_assert!(version.starts_with(|c: char| c.is_ascii_digit()));
        }

        #[test]
        fn repos_have_unique_names(packages in repo_packages_strategy(16)) {
            let mut names: Vec<_> = packages.iter().map(|p| p.name.clone()).collect();
            names.dedup();
            prop_assert_eq!(names.len(), packages.len());
        }
    }
}
