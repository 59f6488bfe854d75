/// Synthetic virtualized issue table for tests
use crate::error::PageError;
use crate::page::{CellSnapshot, Page, RowSnapshot, ScrollContainer};
use std::cell::RefCell;
use std::future::ready;
use std::rc::Rc;
use std::time::Duration;

pub fn linked_cell(issue: &str, value: &str) -> CellSnapshot {
    CellSnapshot {
        text: value.to_string(),
        row: Some(RowSnapshot {
            link_href: Some(format!("https://tracker.test/browse/{}", issue)),
            link_text: Some(issue.to_string()),
            first_cell_text: Some(format!("Summary of {}", issue)),
        }),
        sibling_index: Some(0),
    }
}

#[derive(Debug)]
struct Table {
    values: Vec<String>,
    row_height: f64,
    viewport: f64,
    overscan: f64,
    loaded: usize,
    /// Rows appended by a settle that finds the viewport near the end
    stream_batch: usize,
    scroll_top: f64,
    has_container: bool,
    /// Detach the container once this many scroll writes have happened
    detach_after_writes: Option<usize>,
    scroll_writes: Vec<f64>,
    settles: Vec<Duration>,
}

impl Table {
    fn scroll_height(&self) -> f64 {
        self.loaded as f64 * self.row_height
    }

    fn detached(&self) -> bool {
        self.detach_after_writes
            .is_some_and(|limit| self.scroll_writes.len() >= limit)
    }

    fn rendered(&self) -> Vec<usize> {
        if !self.has_container {
            return (0..self.loaded).collect();
        }
        let top = self.scroll_top - self.overscan;
        let bottom = self.scroll_top + self.viewport + self.overscan;
        (0..self.loaded)
            .filter(|&i| {
                let start = i as f64 * self.row_height;
                start < bottom && start + self.row_height > top
            })
            .collect()
    }
}

/// A table that renders only the rows near its scroll position.
#[derive(Debug, Clone)]
pub struct TablePage {
    table: Rc<RefCell<Table>>,
}

impl TablePage {
    /// Rows `PROJ-1..` with the given values, `row_height` px each.
    pub fn virtualized(values: &[&str], row_height: f64, viewport: f64) -> Self {
        TablePage {
            table: Rc::new(RefCell::new(Table {
                values: values.iter().map(|v| v.to_string()).collect(),
                row_height,
                viewport,
                overscan: 0.0,
                loaded: values.len(),
                stream_batch: 0,
                scroll_top: 0.0,
                has_container: true,
                detach_after_writes: None,
                scroll_writes: Vec::new(),
                settles: Vec::new(),
            })),
        }
    }

    /// Every row rendered at once, with no scroll container.
    pub fn static_rows(values: &[&str]) -> Self {
        let page = Self::virtualized(values, 40.0, 400.0);
        page.table.borrow_mut().has_container = false;
        page
    }

    pub fn with_overscan(self, overscan: f64) -> Self {
        self.table.borrow_mut().overscan = overscan;
        self
    }

    /// Start with `initial` rows loaded and stream `batch` more whenever a
    /// settle finds the viewport within one row of the end.
    pub fn streaming(self, initial: usize, batch: usize) -> Self {
        {
            let mut table = self.table.borrow_mut();
            table.loaded = initial.min(table.values.len());
            table.stream_batch = batch;
        }
        self
    }

    pub fn detach_after_writes(self, writes: usize) -> Self {
        self.table.borrow_mut().detach_after_writes = Some(writes);
        self
    }

    pub fn scroll_writes(&self) -> Vec<f64> {
        self.table.borrow().scroll_writes.clone()
    }

    pub fn settles(&self) -> Vec<Duration> {
        self.table.borrow().settles.clone()
    }
}

#[derive(Debug, Clone)]
pub struct TableContainer {
    table: Rc<RefCell<Table>>,
}

impl ScrollContainer for TableContainer {
    fn scroll_top(&self) -> Result<f64, PageError> {
        let table = self.table.borrow();
        if table.detached() {
            return Err(PageError::ContainerDetached);
        }
        Ok(table.scroll_top)
    }

    fn set_scroll_top(&self, offset: f64) -> Result<(), PageError> {
        let mut table = self.table.borrow_mut();
        if table.detached() {
            return Err(PageError::ContainerDetached);
        }
        table.scroll_writes.push(offset);
        let max_top = (table.scroll_height() - table.viewport).max(0.0);
        table.scroll_top = offset.clamp(0.0, max_top);
        Ok(())
    }

    fn scroll_height(&self) -> Result<f64, PageError> {
        let table = self.table.borrow();
        if table.detached() {
            return Err(PageError::ContainerDetached);
        }
        Ok(table.scroll_height())
    }
}

impl Page for TablePage {
    type Container = TableContainer;

    fn story_point_cells(&self) -> Vec<CellSnapshot> {
        let table = self.table.borrow();
        table
            .rendered()
            .into_iter()
            .enumerate()
            .map(|(position, row)| {
                let mut cell = linked_cell(&format!("PROJ-{}", row + 1), &table.values[row]);
                cell.sibling_index = Some(position);
                cell
            })
            .collect()
    }

    fn scroll_container(&self) -> Option<TableContainer> {
        let has_container = self.table.borrow().has_container;
        has_container.then(|| TableContainer {
            table: Rc::clone(&self.table),
        })
    }

    fn settle(&self, delay: Duration) -> impl Future<Output = ()> {
        let mut table = self.table.borrow_mut();
        table.settles.push(delay);
        let near_end =
            table.scroll_top + table.viewport >= table.scroll_height() - table.row_height;
        if table.stream_batch > 0 && near_end {
            table.loaded = (table.loaded + table.stream_batch).min(table.values.len());
        }
        ready(())
    }
}
