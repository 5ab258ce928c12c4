//! Variable-length row lists with stable row identity.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identity of a row, independent of its position and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId(u64);

impl RowId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Row<T> {
    id: RowId,
    value: T,
}

/// Ordered list of rows that always holds at least one row.
///
/// Rows and their ids live in a single vector, so the visible row list and
/// the stored values cannot drift apart.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemList<T> {
    rows: Vec<Row<T>>,
    next_id: u64,
}

impl<T: Default> Default for ItemList<T> {
    fn default() -> Self {
        let mut list = Self {
            rows: Vec::new(),
            next_id: 0,
        };
        list.add();
        list
    }
}

impl<T: Default> ItemList<T> {
    /// Builds a list from stored values, seeding one default row when empty.
    pub fn from_values(values: Vec<T>) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let rows: Vec<Row<T>> = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| Row {
                id: RowId(index as u64),
                value,
            })
            .collect();
        let next_id = rows.len() as u64;
        Self { rows, next_id }
    }

    /// Appends a default row and returns its id.
    pub fn add(&mut self) -> RowId {
        let id = RowId(self.next_id);
        self.next_id += 1;
        self.rows.push(Row {
            id,
            value: T::default(),
        });
        id
    }
}

impl<T> ItemList<T> {
    /// Removes the row at `index`.
    ///
    /// Returns `false` without touching the list when only one row remains or
    /// the index is out of range.
    pub fn remove(&mut self, index: usize) -> bool {
        if self.rows.len() <= 1 || index >= self.rows.len() {
            return false;
        }
        self.rows.remove(index);
        true
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always `false`; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.rows.get(index).map(|row| &row.value)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.rows.get_mut(index).map(|row| &mut row.value)
    }

    pub fn position(&self, id: RowId) -> Option<usize> {
        self.rows.iter().position(|row| row.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = RowId> + '_ {
        self.rows.iter().map(|row| row.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.rows.iter().map(|row| &row.value)
    }
}

impl<T: Serialize> Serialize for ItemList<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de, T: Deserialize<'de> + Default> Deserialize<'de> for ItemList<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = Vec::<T>::deserialize(deserializer)?;
        Ok(Self::from_values(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Cell(String);

    fn filled(labels: &[&str]) -> ItemList<Cell> {
        ItemList::from_values(labels.iter().map(|label| Cell(label.to_string())).collect())
    }

    #[test]
    fn starts_with_one_row() {
        let list: ItemList<Cell> = ItemList::default();
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(0), Some(&Cell::default()));
    }

    #[test]
    fn remove_refuses_last_row() {
        let mut list = filled(&["only"]);
        assert!(!list.remove(0));
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(0), Some(&Cell("only".into())));
    }

    #[test]
    fn remove_out_of_range_is_noop() {
        let mut list = filled(&["a", "b"]);
        assert!(!list.remove(5));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn remove_preserves_order_of_remaining_rows() {
        let mut list = filled(&["a", "b", "c"]);
        assert!(list.remove(1));
        let values: Vec<&Cell> = list.iter().collect();
        assert_eq!(values, vec![&Cell("a".into()), &Cell("c".into())]);
    }

    #[test]
    fn add_then_remove_last_restores_content() {
        let mut list = filled(&["a", "b"]);
        let before = list.iter().cloned().collect::<Vec<_>>();
        list.add();
        assert!(list.remove(list.len() - 1));
        assert_eq!(list.iter().cloned().collect::<Vec<_>>(), before);
    }

    #[test]
    fn ids_are_never_reused() {
        let mut list = filled(&["a", "b"]);
        let third = list.add();
        assert_eq!(third.get(), 2);
        assert!(list.remove(2));
        let fourth = list.add();
        assert_eq!(fourth.get(), 3);
        assert_eq!(list.position(fourth), Some(2));
        assert_eq!(list.position(third), None);
    }

    #[test]
    fn length_never_drops_below_one() {
        let mut list = filled(&["a"]);
        for step in 0..20 {
            if step % 3 == 0 {
                list.add();
            } else {
                list.remove(0);
            }
            assert!(list.len() >= 1);
        }
        assert_eq!(list.ids().count(), list.len());
    }
}
