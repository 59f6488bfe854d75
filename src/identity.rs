/// Row identity: the key that lets a row be recognised across scroll passes
use crate::page::CellSnapshot;

/// Which source produced a row key, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityTier {
    LinkHref,
    LinkText,
    FirstCellPrefix,
    /// Only stable while sibling order does not change between scans
    Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIdentity {
    pub key: String,
    pub tier: IdentityTier,
}

/// Derive the identity of the row holding a story point cell
///
/// Algorithm:
/// 1. If the cell sits in a row with an issue link, use the link's URL
/// 2. Else the link's visible text (trimmed)
/// 3. Else the first `prefix_len` characters of the row's first cell (trimmed)
/// 4. Else the cell's index among its siblings, or "-1" without a parent
///
/// Empty candidates fall through to the next tier.
///
/// Examples:
/// - row linking https://site/browse/PROJ-12 → "https://site/browse/PROJ-12"
/// - row without a link, first cell "Fix login  " → "Fix login"
/// - cell outside any row, third child of its parent → "2"
pub fn row_identity(cell: &CellSnapshot, prefix_len: usize) -> RowIdentity {
    if let Some(row) = &cell.row {
        let from_link = non_empty(row.link_href.as_deref())
            .map(|href| (href.to_string(), IdentityTier::LinkHref))
            .or_else(|| {
                non_empty(row.link_text.as_deref().map(str::trim))
                    .map(|text| (text.to_string(), IdentityTier::LinkText))
            });

        if let Some((key, tier)) = from_link {
            return RowIdentity { key, tier };
        }

        let has_link = row.link_href.is_some() || row.link_text.is_some();
        if !has_link {
            if let Some(text) = non_empty(row.first_cell_text.as_deref().map(str::trim)) {
                return RowIdentity {
                    key: leading_chars(text, prefix_len).to_string(),
                    tier: IdentityTier::FirstCellPrefix,
                };
            }
        }
    }

    let key = match cell.sibling_index {
        Some(index) => index.to_string(),
        None => "-1".to_string(),
    };
    RowIdentity {
        key,
        tier: IdentityTier::Position,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Cut to at most `n` characters without splitting a code point.
fn leading_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
