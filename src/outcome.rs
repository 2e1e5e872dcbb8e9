//! Contains the outcomes of inserting into and updating a slot map.

/// The result of [`SlotMap::insert`](crate::SlotMap::insert).
///
/// # Examples
///
/// ```
/// # use keyed_slotmap::*;
/// let mut sm = SlotMap::new();
/// assert_eq!(sm.insert("k", "x"), Insertion::Inserted);
/// assert_eq!(sm.insert("k", "y"), Insertion::AlreadyExisted("x"));
/// assert_eq!(sm["k"], "y");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Insertion<V> {
    /// The key was absent and now occupies a new slot.
    Inserted,

    /// The key was present. Its value was overwritten in place and the
    /// previous value is handed back.
    AlreadyExisted(V),
}

impl<V> Insertion<V> {
    /// Returns `true` if the key occupied a new slot.
    pub fn is_inserted(&self) -> bool {
        match self {
            Insertion::Inserted => true,
            Insertion::AlreadyExisted(_) => false,
        }
    }

    /// Returns the replaced value, if there was one.
    pub fn replaced(self) -> Option<V> {
        match self {
            Insertion::Inserted => None,
            Insertion::AlreadyExisted(old) => Some(old),
        }
    }
}

/// The result of [`SlotMap::update`](crate::SlotMap::update).
///
/// # Examples
///
/// ```
/// # use keyed_slotmap::*;
/// let mut sm: SlotMap<i32, char> = SlotMap::new();
/// assert_eq!(sm.update(&1, 'a'), Update::NotFound('a'));
/// sm.insert(1, 'b');
/// assert_eq!(sm.update(&1, 'c'), Update::Updated('b'));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[must_use = "a failed update hands the value back"]
pub enum Update<V> {
    /// The key was present. Its value was overwritten and the previous value
    /// is handed back.
    Updated(V),

    /// The key was absent. Nothing changed and the offered value is handed
    /// back.
    NotFound(V),
}

impl<V> Update<V> {
    /// Returns `true` if a value was overwritten.
    pub fn is_updated(&self) -> bool {
        match self {
            Update::Updated(_) => true,
            Update::NotFound(_) => false,
        }
    }

    /// Converts into a `Result`, `Ok` holding the replaced value and `Err`
    /// holding the rejected one.
    pub fn into_result(self) -> Result<V, V> {
        match self {
            Update::Updated(old) => Ok(old),
            Update::NotFound(value) => Err(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_accessors() {
        let fresh: Insertion<u8> = Insertion::Inserted;
        assert!(fresh.is_inserted());
        assert_eq!(fresh.replaced(), None);

        let over = Insertion::AlreadyExisted(3u8);
        assert!(!over.is_inserted());
        assert_eq!(over.replaced(), Some(3));
    }

    #[test]
    fn update_accessors() {
        assert!(Update::Updated(1).is_updated());
        assert!(!Update::NotFound(1).is_updated());
        assert_eq!(Update::Updated(1).into_result(), Ok(1));
        assert_eq!(Update::NotFound(2).into_result(), Err(2));
    }
}
