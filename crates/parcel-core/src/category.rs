//! # Item Category Catalogue
//!
//! The fixed list of item categories a declaration may use. A subset of the
//! catalogue is "starred": parcels in those categories must carry between
//! one and three proof-of-purchase attachments.
//!
//! Labels are matched case-insensitively and with surrounding whitespace
//! ignored; the catalogue spelling is what goes on the wire.

use serde::Serialize;

/// One entry of the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ItemCategory {
    /// Canonical label sent to the backend.
    pub label: &'static str,
    /// Whether proof-of-purchase attachments are mandatory.
    pub starred: bool,
}

const fn plain(label: &'static str) -> ItemCategory {
    ItemCategory {
        label,
        starred: false,
    }
}

const fn starred(label: &'static str) -> ItemCategory {
    ItemCategory {
        label,
        starred: true,
    }
}

/// Every category accepted by the backend, in display order.
pub const CATALOGUE: &[ItemCategory] = &[
    plain("Accessories (Non-Electronic)"),
    plain("Art & Craft Supplies"),
    plain("Automotive Accessories"),
    plain("Baby Care"),
    plain("Bags & Wallets"),
    starred("Branded Bags & Wallets"),
    plain("Books & Stationery"),
    starred("Cameras & Lenses"),
    plain("Camping & Outdoor Gear"),
    plain("Cleaning Supplies"),
    plain("Clothing"),
    starred("Computer Components"),
    plain("Cosmetics & Skincare"),
    plain("Documents"),
    starred("Drones"),
    plain("Dry Food & Snacks"),
    starred("Electronic Accessories"),
    plain("Eyewear"),
    plain("Fabric & Textiles"),
    plain("Fitness Equipment"),
    starred("Gaming Consoles"),
    plain("Gardening Tools"),
    plain("Hair Care"),
    plain("Hand Tools"),
    plain("Health Supplements"),
    plain("Home Decor"),
    starred("Home Appliances"),
    plain("Household Items"),
    starred("Jewellery"),
    plain("Kitchenware"),
    starred("Laptops & Computers"),
    plain("Lighting"),
    starred("Mobile Phones"),
    starred("Tablets"),
    plain("Musical Instruments"),
    plain("Office Supplies"),
    plain("Party Supplies"),
    starred("Perfume"),
    plain("Pet Supplies"),
    starred("Power Tools"),
    plain("Shoes"),
    starred("Smart Watches"),
    plain("Spare Parts"),
    plain("Sports Equipment"),
    plain("Stickers & Posters"),
    plain("Toys & Games"),
    plain("Umbrellas"),
    starred("Watches"),
    starred("Audio Equipment"),
    plain("Other"),
];

/// Look up a category by label.
pub fn find(label: &str) -> Option<&'static ItemCategory> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    CATALOGUE.iter().find(|c| c.label.eq_ignore_ascii_case(label))
}

/// Whether `label` names a starred category. Unknown labels are not starred.
pub fn is_starred(label: &str) -> bool {
    find(label).is_some_and(|c| c.starred)
}

/// Iterate over the starred subset.
pub fn starred_categories() -> impl Iterator<Item = &'static ItemCategory> {
    CATALOGUE.iter().filter(|c| c.starred)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalogue_has_fifty_unique_labels() {
        assert_eq!(CATALOGUE.len(), 50);
        let unique: HashSet<String> = CATALOGUE
            .iter()
            .map(|c| c.label.to_ascii_lowercase())
            .collect();
        assert_eq!(unique.len(), CATALOGUE.len());
    }

    #[test]
    fn starred_subset_is_proper_and_non_empty() {
        let count = starred_categories().count();
        assert!(count > 0);
        assert!(count < CATALOGUE.len());
    }

    #[test]
    fn lookup_is_case_insensitive_and_trims() {
        let c = find("  mobile phones ").unwrap();
        assert_eq!(c.label, "Mobile Phones");
        assert!(c.starred);
    }

    #[test]
    fn unknown_and_blank_labels_are_not_found() {
        assert!(find("Spaceships").is_none());
        assert!(find("").is_none());
        assert!(!is_starred("Spaceships"));
    }

    #[test]
    fn clothing_is_not_starred() {
        assert!(!is_starred("Clothing"));
    }
}
