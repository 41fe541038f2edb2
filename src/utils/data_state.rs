/// Type-state machine for async data operations
///
/// Replaces the `{ data, is_loading, error }` flag triple with a single enum
/// so that impossible combinations (loading *and* errored, data *and* error)
/// cannot be represented. Query cache entries publish this type to observers.
///
/// # Examples
///
/// ```
/// let mut state: DataState<Profile> = DataState::Pending;
///
/// // During fetch:
/// state = DataState::Loading;
///
/// // On success:
/// state = DataState::Loaded(profile);
///
/// // On error:
/// state = DataState::Error(FetchError::Timeout);
/// ```

#[derive(Debug, Clone, PartialEq)]
pub enum DataState<T, E = String> {
    /// Initial state, no action taken yet
    Pending,

    /// Currently loading/fetching data
    Loading,

    /// Successfully loaded with data
    Loaded(T),

    /// Failed to load
    Error(E),
}

impl<T, E> DataState<T, E> {
    /// Returns true if state is Pending
    pub fn is_pending(&self) -> bool {
        matches!(self, DataState::Pending)
    }

    /// Returns true if state is Loading
    pub fn is_loading(&self) -> bool {
        matches!(self, DataState::Loading)
    }

    /// Returns true if state is Loaded
    pub fn is_loaded(&self) -> bool {
        matches!(self, DataState::Loaded(_))
    }

    /// Returns true if state is Error
    pub fn is_error(&self) -> bool {
        matches!(self, DataState::Error(_))
    }

    /// Returns the data if loaded, None otherwise
    pub fn data(&self) -> Option<&T> {
        match self {
            DataState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    /// Returns the error if in error state, None otherwise
    pub fn error(&self) -> Option<&E> {
        match self {
            DataState::Error(err) => Some(err),
            _ => None,
        }
    }
}

impl<T, E> Default for DataState<T, E> {
    fn default() -> Self {
        DataState::Pending
    }
}

/// Helper to convert Result into DataState
impl<T, E> From<Result<T, E>> for DataState<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => DataState::Loaded(data),
            Err(err) => DataState::Error(err),
        }
    }
}
