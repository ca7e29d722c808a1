use tracing::trace;

use super::{Session, Var, View};

/// Commit boundary between a continuously changing input and a submitted value.
///
/// The exposed [`view`](Submitter::view) only changes when
/// [`trigger`](Submitter::trigger) is called while the source holds a value.
/// It starts out as `None`.
pub struct Submitter<T> {
    source: View<Option<T>>,
    committed: Var<Option<T>>,
}

impl<T> Clone for Submitter<T> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            committed: self.committed.clone(),
        }
    }
}

impl<T: Clone + 'static> Submitter<T> {
    pub fn new(session: &Session, source: View<Option<T>>) -> Self {
        Self {
            source,
            committed: Var::new(session, None),
        }
    }

    /// The last committed value.
    pub fn view(&self) -> View<Option<T>> {
        self.committed.view()
    }

    pub fn input(&self) -> &View<Option<T>> {
        &self.source
    }

    /// Commit the source's current value. Does nothing while the source
    /// holds `None`.
    pub fn trigger(&self) {
        match self.source.get() {
            Some(value) => {
                trace!("submitter committed (version {})", self.committed.version() + 1);
                self.committed.set(Some(value));
            }
            None => trace!("submitter skipped: no value to commit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn non_empty(text: &String) -> Option<String> {
        (!text.is_empty()).then(|| text.clone())
    }

    #[test]
    fn view_is_stable_between_triggers() {
        let session = Session::new();
        let input = Var::new(&session, String::from("one"));
        let submitter = Submitter::new(&session, input.view().map(non_empty));
        assert_eq!(submitter.view().get(), None);

        submitter.trigger();
        assert_eq!(submitter.view().get().as_deref(), Some("one"));

        input.set(String::from("two"));
        input.set(String::from("three"));
        assert_eq!(submitter.view().get().as_deref(), Some("one"));

        submitter.trigger();
        assert_eq!(submitter.view().get().as_deref(), Some("three"));
    }

    #[test]
    fn trigger_without_value_is_a_noop() {
        let session = Session::new();
        let input = Var::new(&session, String::from("kept"));
        let submitter = Submitter::new(&session, input.view().map(non_empty));

        // From the initial state.
        input.set(String::new());
        let before = submitter.view().version();
        submitter.trigger();
        assert_eq!(submitter.view().get(), None);
        assert_eq!(submitter.view().version(), before);

        // From a committed state.
        input.set(String::from("kept"));
        submitter.trigger();
        input.set(String::new());
        let before = submitter.view().version();
        submitter.trigger();
        submitter.trigger();
        assert_eq!(submitter.view().get().as_deref(), Some("kept"));
        assert_eq!(submitter.view().version(), before);
    }

    #[test]
    fn retriggering_the_same_value_still_commits() {
        let session = Session::new();
        let input = Var::new(&session, String::from("same"));
        let submitter = Submitter::new(&session, input.view().map(non_empty));

        submitter.trigger();
        let first = submitter.view().version();
        submitter.trigger();
        assert_eq!(submitter.view().version(), first + 1);
    }
}
