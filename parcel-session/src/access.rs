use std::collections::BTreeSet;

use crate::error::{OrderError, Result};
use crate::state::schema::ChatId;

/// Static allow-list of administrator chat identities.
///
/// Iteration is in ascending id order, which is also the broadcast order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminSet {
    ids: BTreeSet<ChatId>,
}

impl AdminSet {
    pub fn new(ids: impl IntoIterator<Item = ChatId>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn contains(&self, chat: ChatId) -> bool {
        self.ids.contains(&chat)
    }

    /// Fail with [`OrderError::AccessDenied`] unless `caller` is an administrator.
    pub fn authorize(&self, caller: ChatId) -> Result<()> {
        if self.contains(caller) {
            Ok(())
        } else {
            Err(OrderError::AccessDenied)
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = ChatId> + '_ {
        self.ids.iter().copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }
}

impl From<Vec<i64>> for AdminSet {
    fn from(ids: Vec<i64>) -> Self {
        Self::new(ids.into_iter().map(ChatId))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize() {
        let admins = AdminSet::from(vec![42, 7]);
        assert!(admins.authorize(ChatId(42)).is_ok());
        assert!(matches!(
            admins.authorize(ChatId(1)),
            Err(OrderError::AccessDenied)
        ));
    }

    #[test]
    fn test_iterates_in_ascending_order_without_duplicates() {
        let admins = AdminSet::from(vec![42, 7, 42, 19]);
        let ids: Vec<_> = admins.iter().collect();
        assert_eq!(ids, vec![ChatId(7), ChatId(19), ChatId(42)]);
        assert_eq!(admins.len(), 3);
    }

    #[test]
    fn test_empty_set_denies_everyone() {
        let admins = AdminSet::default();
        assert_eq!(admins.len(), 0);
        assert!(admins.authorize(ChatId(0)).is_err());
    }
}
