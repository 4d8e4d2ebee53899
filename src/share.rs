use crate::model::{Item, List};

const DEFAULT_BASKET_TITLE: &str = "Shopping List";

/// Plain-text basket for sharing to another app. `None` when the basket is empty.
pub fn basket_message(name: Option<&str>, basket: &[Item]) -> Option<String> {
    if basket.is_empty() {
        return None;
    }
    let title = name.filter(|n| !n.is_empty()).unwrap_or(DEFAULT_BASKET_TITLE);
    Some(format!("{title}\n\n{}", item_lines(basket, false)))
}

/// Plain-text past list with purchase marks and a progress footer.
pub fn list_message(list: &List) -> Option<String> {
    if list.items.is_empty() {
        return None;
    }
    Some(format!(
        "Shopping List: {}\n\n{}\n\n{}",
        list.name,
        item_lines(&list.items, true),
        list.progress()
    ))
}

fn item_lines(items: &[Item], mark_purchased: bool) -> String {
    items
        .iter()
        .map(|item| {
            if mark_purchased && item.is_purchased() {
                format!("{item} ✓")
            } else {
                item.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
