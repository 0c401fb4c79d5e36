#![forbid(unsafe_code)]

//! Text search over the document.

use std::fmt;

use bined_core::{BinaryData, CaretPosition, DataError, SelectionRange};

use crate::view::CodeAreaView;

/// Outcome of a search request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Match found at the given position; it is now selected.
    Found(u64),
    NotFound,
}

/// Errors raised by a search service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// Find again was requested before any search.
    NoActiveSearch,
    /// The search text is empty.
    EmptyQuery,
    Data(DataError),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoActiveSearch => write!(f, "No active search"),
            Self::EmptyQuery => write!(f, "Search text is empty"),
            Self::Data(e) => write!(f, "search failed: {e}"),
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Data(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DataError> for SearchError {
    fn from(e: DataError) -> Self {
        Self::Data(e)
    }
}

/// Search collaborator used by macro playback.
pub trait SearchService {
    /// Search forward from the caret for `text`.
    fn perform_search_text(
        &mut self,
        view: &mut CodeAreaView,
        text: &str,
        match_case: bool,
    ) -> Result<SearchOutcome, SearchError>;

    /// Repeat the last search from just past its last match.
    fn perform_find_again(&mut self, view: &mut CodeAreaView) -> Result<SearchOutcome, SearchError>;
}

#[derive(Debug, Clone)]
struct ActiveSearch {
    pattern: Vec<u8>,
    match_case: bool,
    last_match: Option<u64>,
}

/// Forward search for the UTF-8 bytes of a text.
///
/// Case-insensitive matching folds ASCII letters only.
#[derive(Debug, Clone, Default)]
pub struct BinarySearch {
    active: Option<ActiveSearch>,
}

impl BinarySearch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of the active search, if any.
    #[must_use]
    pub fn active_pattern(&self) -> Option<&[u8]> {
        self.active.as_ref().map(|a| a.pattern.as_slice())
    }

    fn find_from<D: BinaryData + ?Sized>(
        data: &D,
        pattern: &[u8],
        match_case: bool,
        from: u64,
    ) -> Result<Option<u64>, SearchError> {
        let size = data.size();
        let needle = pattern.len() as u64;
        if needle > size || from > size - needle {
            return Ok(None);
        }
        let haystack = data.copy(from, size - from)?;
        let found = haystack.windows(pattern.len()).position(|window| {
            if match_case {
                window == pattern
            } else {
                window.eq_ignore_ascii_case(pattern)
            }
        });
        Ok(found.map(|offset| from + offset as u64))
    }

    fn run(
        &mut self,
        view: &mut CodeAreaView,
        from: u64,
    ) -> Result<SearchOutcome, SearchError> {
        let Some(active) = self.active.as_mut() else {
            return Err(SearchError::NoActiveSearch);
        };
        let found = Self::find_from(
            view.area.content_data(),
            &active.pattern,
            active.match_case,
            from,
        )?;
        let Some(position) = found else {
            tracing::debug!(from, "search found no match");
            return Ok(SearchOutcome::NotFound);
        };
        active.last_match = Some(position);
        let caret = view.area.caret_position();
        view.area.set_caret_position(caret.moved_to(position, 0));
        view.area.set_selection(SelectionRange::from_length(
            position,
            active.pattern.len() as u64,
        ));
        view.area.reveal_cursor();
        tracing::debug!(position, "search match");
        Ok(SearchOutcome::Found(position))
    }
}

impl SearchService for BinarySearch {
    fn perform_search_text(
        &mut self,
        view: &mut CodeAreaView,
        text: &str,
        match_case: bool,
    ) -> Result<SearchOutcome, SearchError> {
        if text.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        self.active = Some(ActiveSearch {
            pattern: text.as_bytes().to_vec(),
            match_case,
            last_match: None,
        });
        let CaretPosition { data_position, .. } = view.area.caret_position();
        self.run(view, data_position)
    }

    fn perform_find_again(&mut self, view: &mut CodeAreaView) -> Result<SearchOutcome, SearchError> {
        let from = match self.active.as_ref() {
            None => return Err(SearchError::NoActiveSearch),
            Some(ActiveSearch {
                last_match: Some(position),
                ..
            }) => position + 1,
            Some(_) => view.area.caret_position().data_position,
        };
        self.run(view, from)
    }
}
