/// The page as seen by the scanner: a DOM-query capability passed in by the
/// caller instead of read from globals.
use crate::error::PageError;
use std::time::Duration;

/// What the scanner needs to know about one story point cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellSnapshot {
    /// Raw text content of the cell
    pub text: String,
    /// The enclosing row, if the cell sits inside one
    pub row: Option<RowSnapshot>,
    /// Position among the cell's siblings, `None` when it has no parent
    pub sibling_index: Option<usize>,
}

/// Identity-bearing parts of a table row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSnapshot {
    pub link_href: Option<String>,
    pub link_text: Option<String>,
    pub first_cell_text: Option<String>,
}

/// The scrollable element wrapping a virtualized row list.
pub trait ScrollContainer {
    fn scroll_top(&self) -> Result<f64, PageError>;
    fn set_scroll_top(&self, offset: f64) -> Result<(), PageError>;
    fn scroll_height(&self) -> Result<f64, PageError>;
}

/// Read access to the current document plus a way to yield to it.
pub trait Page {
    type Container: ScrollContainer;

    /// Snapshot every story point cell currently rendered, in document order.
    fn story_point_cells(&self) -> Vec<CellSnapshot>;

    fn scroll_container(&self) -> Option<Self::Container>;

    /// Yield to the page so it can render rows revealed by the last scroll.
    fn settle(&self, delay: Duration) -> impl Future<Output = ()>;
}
