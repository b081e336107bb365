//! Two-level install-location hierarchy for the sunburst chart.
//!
//! Location codes are a category letter followed by a sub-code digit
//! (`A1` is a special-class railway station, `L1` a convenience store).
//! The first level groups by letter, the second lists the sub-codes.

use crate::models::{BucketCount, CategoryNode, FilterState, HierarchyView, Record};
use tracing::debug;

/// Label for a top-level category letter.
pub fn category_name(letter: char) -> Option<&'static str> {
    let name = match letter {
        'A' => "火車站",
        'B' => "地方政府",
        'C' => "其他公務機關",
        'D' => "高鐵站",
        'E' => "長途客運站",
        'F' => "捷運站",
        'G' => "機場",
        'H' => "醫院",
        'I' => "學校",
        'J' => "大型賣場及百貨公司",
        'K' => "其他公共場所",
        'L' => "便利商店",
        'O' => "其他",
        _ => return None,
    };
    Some(name)
}

/// Label for a full sub-code such as `H2`.
pub fn subcategory_name(code: &str) -> Option<&'static str> {
    let name = match code {
        "A1" => "特等站",
        "A2" => "一等站",
        "A3" => "二等站",
        "A4" => "其他等級",
        "B1" => "直轄市",
        "B2" => "縣市",
        "C1" => "其他公務機關",
        "D1" => "高鐵站",
        "E1" => "長途客運站",
        "F1" => "捷運站",
        "G1" => "機場",
        "H1" => "醫學中心",
        "H2" => "區域醫院",
        "H3" => "地區醫院",
        "H4" => "其他等級",
        "I1" => "大專院校以上",
        "I2" => "高級中等學校",
        "I3" => "國中",
        "I4" => "小學",
        "J1" => "大型賣場及百貨公司",
        "K1" => "其他公共場所",
        "L1" => "便利商店",
        "O1" => "其他",
        _ => return None,
    };
    Some(name)
}

/// Sub-code counted under a category, before labels are attached.
struct SubCount {
    code: String,
    label: String,
    count: usize,
}

/// Compute the sunburst view for the current filter.
///
/// The chart is only shown for a single bank, so with the bank filter set
/// to all nothing is computed and the view is [`HierarchyView::Hidden`].
pub fn location_hierarchy(records: &[&Record], filter: &FilterState) -> HierarchyView {
    if filter.bank.is_all() {
        return HierarchyView::Hidden;
    }

    let nodes = build_hierarchy(records);
    if nodes.is_empty() {
        HierarchyView::Empty
    } else {
        HierarchyView::Visible(nodes)
    }
}

/// Group location codes into categories, largest category first.
///
/// Blank codes and codes whose letter is not a known category are
/// skipped. Equal counts keep the order in which codes first appear.
pub fn build_hierarchy(records: &[&Record]) -> Vec<CategoryNode> {
    let mut code_counts: Vec<(&str, usize)> = Vec::new();
    for record in records {
        let code = record.location_category.trim();
        if code.is_empty() {
            continue;
        }
        match code_counts.iter_mut().find(|(seen, _)| *seen == code) {
            Some((_, count)) => *count += 1,
            None => code_counts.push((code, 1)),
        }
    }

    let mut by_category: Vec<(char, Vec<SubCount>)> = Vec::new();
    for (code, count) in code_counts {
        let Some(letter) = code.chars().next() else {
            continue;
        };
        if category_name(letter).is_none() {
            debug!("Ignoring unknown location category code: {}", code);
            continue;
        }

        let sub = SubCount {
            code: code.to_string(),
            label: subcategory_name(code).unwrap_or(code).to_string(),
            count,
        };
        match by_category.iter_mut().find(|(seen, _)| *seen == letter) {
            Some((_, subs)) => subs.push(sub),
            None => by_category.push((letter, vec![sub])),
        }
    }

    let mut nodes: Vec<CategoryNode> = by_category
        .into_iter()
        .filter_map(|(letter, mut subs)| {
            let label = category_name(letter)?;
            subs.sort_by_key(|sub| std::cmp::Reverse(sub.count));

            let total: usize = subs.iter().map(|sub| sub.count).sum();
            if total == 0 {
                return None;
            }

            let children = if collapses_into_parent(label, &subs) {
                None
            } else {
                Some(
                    subs.into_iter()
                        .map(|sub| BucketCount::new(sub.label, sub.count))
                        .collect(),
                )
            };

            Some(CategoryNode {
                label: label.to_string(),
                count: total,
                children,
            })
        })
        .collect();

    nodes.sort_by_key(|node| std::cmp::Reverse(node.count));
    nodes
}

/// A category with a single sub-code meaning the same as the category
/// itself gets no second ring.
///
/// Most single-meaning codes end in `1` (`C1`, `L1`, `O1`, ...), so that
/// suffix counts as "same meaning" even when the labels differ.
fn collapses_into_parent(parent_label: &str, subs: &[SubCount]) -> bool {
    match subs {
        [only] => only.label == parent_label || only.code.ends_with('1'),
        _ => false,
    }
}
