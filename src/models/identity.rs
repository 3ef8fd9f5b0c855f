/// A record with a stable identity.
///
/// The identity is unique within a collection and never changes across
/// updates of the same record. Reconciliation and write routing key on it.
pub trait Identifiable {
    fn identity(&self) -> &str;
}

impl<T: Identifiable + ?Sized> Identifiable for Box<T> {
    fn identity(&self) -> &str {
        (**self).identity()
    }
}

impl<T: Identifiable + ?Sized> Identifiable for std::sync::Arc<T> {
    fn identity(&self) -> &str {
        (**self).identity()
    }
}
