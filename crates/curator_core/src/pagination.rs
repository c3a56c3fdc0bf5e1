use crate::selection::SelectionSet;
use crate::{CollectionId, Company, CompanyId, Page, PageError};

pub const DEFAULT_PAGE_SIZE: u64 = 50;

/// What the gateway should fetch. `generation` lets the controller drop
/// responses that were overtaken by a newer request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub collection_id: CollectionId,
    pub offset: u64,
    pub limit: u64,
    pub generation: u64,
}

/// Current page, page size, search term, and the selection scoped to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageController {
    collection_id: Option<CollectionId>,
    page: u64,
    page_size: u64,
    search_term: String,
    current: Option<Page>,
    selection: SelectionSet,
    generation: u64,
    loading: bool,
}

impl Default for PageController {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PageController {
    pub fn new(page_size: u64) -> Self {
        Self {
            collection_id: None,
            page: 1,
            page_size: page_size.max(1),
            search_term: String::new(),
            current: None,
            selection: SelectionSet::new(),
            generation: 0,
            loading: false,
        }
    }

    pub fn set_collection(&mut self, id: CollectionId) -> Option<PageRequest> {
        self.collection_id = Some(id);
        self.page = 1;
        self.search_term.clear();
        // The old page belongs to another collection.
        self.current = None;
        self.selection.select_none();
        self.fetch()
    }

    /// Forget the collection entirely, e.g. after it was deleted.
    pub fn clear_collection(&mut self) {
        self.collection_id = None;
        self.page = 1;
        self.search_term.clear();
        self.current = None;
        self.selection.select_none();
        self.generation += 1;
        self.loading = false;
    }

    pub fn set_page(&mut self, page: u64) -> Result<Option<PageRequest>, PageError> {
        let total_pages = self.total_pages();
        if page == 0 || page > total_pages {
            return Err(PageError::OutOfRange {
                requested: page,
                total_pages,
            });
        }
        self.page = page;
        self.selection.select_none();
        Ok(self.fetch())
    }

    pub fn next_page(&mut self) -> Option<PageRequest> {
        if self.page < self.total_pages() {
            self.set_page(self.page + 1).ok().flatten()
        } else {
            None
        }
    }

    pub fn previous_page(&mut self) -> Option<PageRequest> {
        if self.page > 1 {
            self.set_page(self.page - 1).ok().flatten()
        } else {
            None
        }
    }

    /// Search only filters the loaded page. A non-empty term rewinds to page
    /// one, which is a page change and therefore clears the selection.
    pub fn set_search_term(&mut self, term: impl Into<String>) -> Option<PageRequest> {
        self.search_term = term.into();
        if !self.search_term.is_empty() && self.page != 1 {
            self.page = 1;
            self.selection.select_none();
            return self.fetch();
        }
        None
    }

    pub fn fetch(&mut self) -> Option<PageRequest> {
        let collection_id = self.collection_id.clone()?;
        self.generation += 1;
        self.loading = true;
        Some(PageRequest {
            collection_id,
            offset: (self.page - 1) * self.page_size,
            limit: self.page_size,
            generation: self.generation,
        })
    }

    /// Replaces the held page. Returns false for a stale response.
    pub fn apply_page(&mut self, generation: u64, page: Page) -> bool {
        if generation != self.generation
            || self.collection_id.as_ref() != Some(&page.collection_id)
        {
            return false;
        }
        self.current = Some(page);
        self.loading = false;
        self.selection.select_none();
        true
    }

    /// Returns false when the failed request was already superseded.
    pub fn fail_fetch(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.loading = false;
        true
    }

    pub fn select_all(&mut self) {
        let visible: Vec<CompanyId> = self.visible_records().iter().map(|c| c.id).collect();
        self.selection.select_all(visible);
    }

    pub fn select_none(&mut self) {
        self.selection.select_none();
    }

    pub fn toggle_selected(&mut self, id: CompanyId) -> bool {
        self.selection.toggle(id)
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn visible_records(&self) -> Vec<&Company> {
        let Some(page) = &self.current else {
            return Vec::new();
        };
        if self.search_term.is_empty() {
            return page.companies.iter().collect();
        }
        let needle = self.search_term.to_lowercase();
        page.companies
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn collection_id(&self) -> Option<&CollectionId> {
        self.collection_id.as_ref()
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn current(&self) -> Option<&Page> {
        self.current.as_ref()
    }

    pub(crate) fn current_mut(&mut self) -> Option<&mut Page> {
        self.current.as_mut()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn total(&self) -> u64 {
        self.current.as_ref().map_or(0, |p| p.total)
    }

    pub fn total_pages(&self) -> u64 {
        self.total().div_ceil(self.page_size)
    }

    /// 1-based index of the first record on this page, 0 when empty.
    pub fn start_index(&self) -> u64 {
        if self.total() == 0 {
            return 0;
        }
        (self.page - 1) * self.page_size + 1
    }

    pub fn end_index(&self) -> u64 {
        (self.page * self.page_size).min(self.total())
    }
}
