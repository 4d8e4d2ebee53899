//! Static item catalog browsed by category.

use crate::model::{Item, ItemDraft};
use std::collections::BTreeSet;
use std::fmt;

const IMAGE_BASE: &str = "https://images.unsplash.com/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Liquid,
    Solid,
    Count,
}

impl ItemKind {
    pub fn default_unit(self) -> &'static str {
        match self {
            ItemKind::Liquid => "L",
            ItemKind::Solid => "kg",
            ItemKind::Count => "pc",
        }
    }

    pub fn unit_options(self) -> &'static [&'static str] {
        match self {
            ItemKind::Liquid => &["mL", "L"],
            ItemKind::Solid => &["g", "kg"],
            ItemKind::Count => &["pc", "dozen"],
        }
    }

    /// Next unit in the cycle; unknown units restart at the first option.
    pub fn next_unit(self, current: &str) -> &'static str {
        let options = self.unit_options();
        match options.iter().position(|u| *u == current) {
            Some(idx) => options[(idx + 1) % options.len()],
            None => options[0],
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Liquid => write!(f, "liquid"),
            ItemKind::Solid => write!(f, "solid"),
            ItemKind::Count => write!(f, "count"),
        }
    }
}

#[derive(Debug)]
pub struct CatalogItem {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: ItemKind,
    photo: &'static str,
}

impl CatalogItem {
    pub fn image(&self) -> String {
        format!("{IMAGE_BASE}{}", self.photo)
    }

    pub fn draft(&self) -> ItemDraft {
        ItemDraft::new(self.id, self.name, self.image())
    }
}

#[derive(Debug)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    pub items: &'static [CatalogItem],
}

macro_rules! item {
    ($id:literal, $name:literal, $kind:ident, $photo:literal) => {
        CatalogItem {
            id: $id,
            name: $name,
            kind: ItemKind::$kind,
            photo: $photo,
        }
    };
}

pub static CATEGORIES: &[Category] = &[
    Category {
        id: "snacks",
        name: "Snacks",
        items: &[
            item!("s1", "Mixed Nuts", Solid, "photo-1599599810769-bcde5a160d32"),
            item!("s2", "Potato Chips", Solid, "photo-1566478989037-eec170784d0b"),
            item!("s3", "Dark Chocolate", Solid, "photo-1606312619070-d48b4c652a52"),
            item!("s4", "Trail Mix", Solid, "photo-1594489428504-5c0c480a15fd"),
            item!("s5", "Popcorn", Solid, "photo-1578849278619-e73505e9610f"),
            item!("s6", "Pretzels", Solid, "photo-1599490659213-e2b9527bd087"),
            item!("s7", "Dried Fruit", Solid, "photo-1596567595142-e9b1656e7cd8"),
            item!("s8", "Granola Bars", Count, "photo-1599490659213-e2b9527bd087"),
            item!("s9", "Rice Cakes", Count, "photo-1558961363-fa8fdf82db35"),
            item!("s10", "Crackers", Solid, "photo-1590507621108-433608c97823"),
        ],
    },
    Category {
        id: "breakfast",
        name: "Breakfast",
        items: &[
            item!("b1", "Oatmeal", Solid, "photo-1517673132405-a56a62b18caf"),
            item!("b2", "Cereal", Solid, "photo-1521483451569-e33803c0330c"),
            item!("b3", "Pancake Mix", Solid, "photo-1528207776546-365bb710ee93"),
            item!("b4", "Maple Syrup", Liquid, "photo-1589301760014-d929f3979dbc"),
            item!("b5", "Eggs", Count, "photo-1506976785307-8732e854ad03"),
            item!("b6", "Bread", Count, "photo-1549931319-a545dcf3bc73"),
            item!("b7", "Bagels", Count, "photo-1585445490387-f47934b73b54"),
            item!("b8", "Yogurt", Count, "photo-1563636619-e9143da7973b"),
            item!("b9", "Fresh Berries", Solid, "photo-1563583991746-a3b85a56b697"),
            item!("b10", "Jam", Solid, "photo-1622484211817-4f764a6f72c9"),
        ],
    },
    Category {
        id: "drinks",
        name: "Drinks",
        items: &[
            item!("d1", "Orange Juice", Liquid, "photo-1613478223719-2ab802602423"),
            item!("d2", "Milk", Liquid, "photo-1550583724-b2692b85b150"),
            item!("d3", "Sparkling Water", Liquid, "photo-1598343175492-9e7dc0e63cc6"),
            item!("d4", "Green Tea", Count, "photo-1627435601361-ec25f5b1d0e5"),
            item!("d5", "Lemonade", Liquid, "photo-1621263764928-df1444c5e859"),
            item!("d6", "Coconut Water", Liquid, "photo-1525385133512-2f3bdd039054"),
            item!("d7", "Apple Juice", Liquid, "photo-1600271886742-f049cd451bba"),
            item!("d8", "Iced Tea", Liquid, "photo-1499638673689-79a0b5115d87"),
            item!("d9", "Smoothies", Liquid, "photo-1502741224143-90386d7f8c82"),
            item!("d10", "Energy Drinks", Count, "photo-1625772299848-391b6a87d7b3"),
        ],
    },
    Category {
        id: "coffee",
        name: "Coffee",
        items: &[
            item!("c1", "Coffee Beans", Solid, "photo-1447933601403-0c6688de566e"),
            item!("c2", "Ground Coffee", Solid, "photo-1595435934249-5df7ed86e1c0"),
            item!("c3", "Espresso Pods", Count, "photo-1610889556528-9a770e32642f"),
            item!("c4", "Coffee Filters", Count, "photo-1622465413095-2d3ffa4b7e0f"),
            item!("c5", "Instant Coffee", Solid, "photo-1461023058943-07fcbe16d735"),
            item!("c6", "Cold Brew", Liquid, "photo-1517701550927-30cf4ba1dba5"),
            item!("c7", "Coffee Creamer", Liquid, "photo-1587578855906-7d581eee6d8e"),
            item!("c8", "Sugar Packets", Count, "photo-1581097543550-b3cbe2e6ca4a"),
            item!("c9", "Sweetener", Count, "photo-1581097543550-b3cbe2e6ca4a"),
            item!("c10", "Coffee Syrup", Liquid, "photo-1622465413094-73e7b47358c5"),
        ],
    },
    Category {
        id: "fruits",
        name: "Fruits",
        items: &[
            item!("f1", "Apples", Solid, "photo-1560806887-1e4cd0b6cbd6"),
            item!("f2", "Bananas", Solid, "photo-1571771894821-ce9b6c11b08e"),
            item!("f3", "Oranges", Solid, "photo-1582979512210-99b6a53386f9"),
            item!("f4", "Strawberries", Solid, "photo-1518635017498-87f514b751ba"),
            item!("f5", "Blueberries", Solid, "photo-1498557850523-fd3d118b962e"),
            item!("f6", "Grapes", Solid, "photo-1537640538966-79f369143f8f"),
            item!("f7", "Pineapple", Count, "photo-1550258987-190a2d41a8ba"),
            item!("f8", "Mango", Count, "photo-1553279768-865429fa0078"),
            item!("f9", "Kiwi", Count, "photo-1585059895289-72c27c12bc3b"),
            item!("f10", "Peaches", Solid, "photo-1595017013671-ee8217b4ce51"),
        ],
    },
    Category {
        id: "vegetables",
        name: "Vegetables",
        items: &[
            item!("v1", "Carrots", Solid, "photo-1598170845058-32b9d6a5da37"),
            item!("v2", "Broccoli", Solid, "photo-1459411621453-7b03977f4bfc"),
            item!("v3", "Spinach", Solid, "photo-1576045057995-568f588f82fb"),
            item!("v4", "Tomatoes", Solid, "photo-1518977822534-7049a61ee0c2"),
            item!("v5", "Bell Peppers", Count, "photo-1563565375-f3fdfdbefa83"),
            item!("v6", "Cucumber", Count, "photo-1604977042946-1eecc30f269e"),
            item!("v7", "Lettuce", Count, "photo-1622205313162-be1d5712a43c"),
            item!("v8", "Onions", Solid, "photo-1508747703725-719777637510"),
            item!("v9", "Potatoes", Solid, "photo-1518977676601-b53f82aba655"),
            item!("v10", "Mushrooms", Solid, "photo-1504545102780-26774c1bb073"),
        ],
    },
];

/// Case-insensitive lookup by id or display name.
pub fn category(key: &str) -> Option<&'static Category> {
    CATEGORIES
        .iter()
        .find(|c| c.id.eq_ignore_ascii_case(key) || c.name.eq_ignore_ascii_case(key))
}

pub fn find_item(id: &str) -> Option<&'static CatalogItem> {
    CATEGORIES
        .iter()
        .flat_map(|c| c.items.iter())
        .find(|i| i.id == id)
}

/// Items of a category still up for swiping: not hidden and not already in the basket.
pub fn browse<'a>(
    category: &'a Category,
    hidden: &'a BTreeSet<String>,
    basket: &'a [Item],
) -> impl Iterator<Item = &'a CatalogItem> + 'a {
    let items: &'a [CatalogItem] = category.items;
    items
        .iter()
        .filter(move |i| !hidden.contains(i.id) && !basket.iter().any(|b| b.id == i.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ids_are_unique() {
        let mut seen = BTreeSet::new();
        for item in CATEGORIES.iter().flat_map(|c| c.items.iter()) {
            assert!(seen.insert(item.id), "duplicate id {}", item.id);
        }
    }

    #[test]
    fn category_lookup_by_id_or_name() {
        assert_eq!(category("fruits").unwrap().name, "Fruits");
        assert_eq!(category("Coffee").unwrap().id, "coffee");
        assert!(category("frozen").is_none());
    }

    #[test]
    fn kind_decides_units() {
        assert_eq!(ItemKind::Liquid.default_unit(), "L");
        assert_eq!(ItemKind::Solid.default_unit(), "kg");
        assert_eq!(ItemKind::Count.default_unit(), "pc");
        assert_eq!(ItemKind::Count.next_unit("pc"), "dozen");
        assert_eq!(ItemKind::Count.next_unit("dozen"), "pc");
        assert_eq!(ItemKind::Solid.next_unit("L"), "g");
    }

    #[test]
    fn draft_carries_image_uri() {
        let milk = find_item("d2").unwrap();
        let draft = milk.draft();
        assert_eq!(draft.name, "Milk");
        assert!(draft.image.starts_with(IMAGE_BASE));
    }

    #[test]
    fn browse_skips_hidden_and_basket_items() {
        let fruits = category("fruits").unwrap();
        let hidden: BTreeSet<String> = ["f1".to_string()].into_iter().collect();
        let basket = vec![find_item("f2").unwrap().draft().into_item(1.0, "kg")];
        let ids: Vec<&str> = browse(fruits, &hidden, &basket).map(|i| i.id).collect();
        assert_eq!(ids.len(), 8);
        assert!(!ids.contains(&"f1"));
        assert!(!ids.contains(&"f2"));
    }
}
