use std::collections::HashMap;

use agora_core::Entity;

/// Insertion-ordered rows keyed by entity id.
#[derive(Debug, Clone)]
pub(crate) struct Table<T: Entity> {
    rows: Vec<T>,
    index: HashMap<T::Id, usize>,
}

impl<T: Entity> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Entity + Clone> Table<T> {
    pub(crate) fn get(&self, id: T::Id) -> Option<&T> {
        self.index.get(&id).map(|&i| &self.rows[i])
    }

    /// Append `row`; `false` if its id is already present.
    pub(crate) fn insert(&mut self, row: T) -> bool {
        let id = row.id();
        if self.index.contains_key(&id) {
            return false;
        }
        self.index.insert(id, self.rows.len());
        self.rows.push(row);
        true
    }

    /// Replace the row with the same id; `false` if there is none.
    pub(crate) fn replace(&mut self, row: T) -> bool {
        match self.index.get(&row.id()) {
            Some(&i) => {
                self.rows[i] = row;
                true
            }
            None => false,
        }
    }

    pub(crate) fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Option<&T> {
        self.rows.iter().find(|r| pred(r))
    }

    pub(crate) fn any(&self, pred: impl FnMut(&T) -> bool) -> bool {
        self.rows.iter().any(pred)
    }

    pub(crate) fn filtered(&self, mut pred: impl FnMut(&T) -> bool) -> Vec<T> {
        self.rows.iter().filter(|r| pred(r)).cloned().collect()
    }

    pub(crate) fn all(&self) -> Vec<T> {
        self.rows.clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::PurchaseId;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: PurchaseId,
        n: u32,
    }

    impl Entity for Row {
        type Id = PurchaseId;

        fn id(&self) -> PurchaseId {
            self.id
        }
    }

    #[test]
    fn keeps_insertion_order_and_rejects_duplicate_ids() {
        let mut t = Table::default();
        let a = Row { id: PurchaseId::new(), n: 1 };
        let b = Row { id: PurchaseId::new(), n: 2 };
        assert!(t.insert(b.clone()));
        assert!(t.insert(a.clone()));
        assert!(!t.insert(a.clone()));
        assert_eq!(t.all(), vec![b, a]);
    }

    #[test]
    fn replace_requires_existing_row() {
        let mut t = Table::default();
        let id = PurchaseId::new();
        assert!(!t.replace(Row { id, n: 1 }));
        t.insert(Row { id, n: 1 });
        assert!(t.replace(Row { id, n: 7 }));
        assert_eq!(t.get(id).map(|r| r.n), Some(7));
    }
}
